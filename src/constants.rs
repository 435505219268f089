//! Constants used throughout bootstep

/// Default subdirectory of an installer holding the files to install
pub const DEFAULT_SOURCE_ROOT: &str = "root";

/// Default install script base name
pub const DEFAULT_INSTALL_SCRIPT: &str = "install";

/// Default post-install script base name
pub const DEFAULT_POST_INSTALL_SCRIPT: &str = "postinstall";

/// Scope key under which installer metadata is exposed to templates
pub const INSTALL_META_KEY: &str = "__install__";

/// Reserved key of a parameters entry holding installer options
pub const PARAMS_META_KEY: &str = "meta";

/// Log file settings
pub mod log_file {
    pub const APP_DIR: &str = "bootstep";
    pub const FILE_NAME: &str = "bootstep.log";
    pub const MAX_BYTES: u64 = 1 << 20;
    pub const BACKUP_COUNT: u32 = 10;
}

/// Log targets that are not installer components
pub mod targets {
    pub const MAIN: &str = "main";
    pub const ROLLBACK_SUFFIX: &str = ":rollback";
}

/// Exit codes
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const INFO: u8 = 0;
    pub const DEBUG: u8 = 1;
    pub const TRACE: u8 = 2;
}
