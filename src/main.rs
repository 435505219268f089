use bootstep::{
    cli::{get_args, get_log_level_from_verbose, run},
    error::default_error_handler,
    logging,
};

fn main() {
    let args = get_args();
    let level = get_log_level_from_verbose(args.verbose);

    let requested_log_file = args.log_file.clone().or_else(logging::default_log_path);
    let log_file = logging::init_with_fallback(level, requested_log_file);

    if let Err(err) = run(args) {
        default_error_handler(err, log_file.as_deref());
    }
}
