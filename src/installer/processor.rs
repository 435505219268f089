use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::ioutils::{copy_file, create_dir_all, ScratchFile};
use crate::merge::{merge_file, ConflictStrategy, MergeStrategy};
use crate::renderer::{Scope, TemplateRenderer};

use super::operation::FileOperation;
use super::{key_error, render_file};

/// Renders one source file at a time into the destination tree.
pub struct FileProcessor<'a> {
    /// Dependencies
    engine: &'a dyn TemplateRenderer,
    scope: &'a Scope,

    /// Other
    source_root: &'a Path,
    dest_root: &'a Path,
    merge_strategy: MergeStrategy,
    conflict_strategy: ConflictStrategy,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        scope: &'a Scope,
        source_root: &'a Path,
        dest_root: &'a Path,
        merge_strategy: MergeStrategy,
        conflict_strategy: ConflictStrategy,
    ) -> Self {
        Self { engine, scope, source_root, dest_root, merge_strategy, conflict_strategy }
    }

    /// Renders every component of `relative`, returning `None` when one of
    /// them renders empty.
    ///
    /// # Examples
    ///
    /// - `{% if ci %}.github{% endif %}/ci.yml` with `ci = true` renders to `.github/ci.yml`
    /// - the same path with `ci = false` has an empty component and is skipped
    fn render_relative(&self, relative: &Path, source: &Path) -> Result<Option<PathBuf>> {
        let template_name = source.display().to_string();
        let mut rendered = PathBuf::new();

        let mut components = relative.components();
        while let Some(component) = components.next() {
            let Component::Normal(raw) = component else {
                continue;
            };
            let raw = Path::new(raw).to_str_checked()?;
            let part = self.engine.render(raw, self.scope, Some(&template_name)).map_err(|e| {
                // Rendered so far, then the segments still holding template text.
                let dest_file =
                    self.dest_root.join(&rendered).join(raw).join(components.as_path());
                key_error(e, source, &dest_file)
            })?;

            if part.is_empty() {
                return Ok(None);
            }
            if Path::new(&part).is_absolute() {
                return Err(Error::Other(anyhow::anyhow!(
                    "'{}' renders to absolute path '{part}'",
                    relative.display()
                )));
            }
            rendered.push(part);
        }

        Ok(Some(rendered))
    }

    /// Installs `source` (a file below the source root) into the
    /// destination tree.
    pub fn process(&self, source: &Path) -> Result<FileOperation> {
        let relative =
            source.strip_prefix(self.source_root).map_err(|e| Error::Other(e.into()))?;

        let Some(rendered) = self.render_relative(relative, source)? else {
            return Ok(FileOperation::Skip { source: source.to_path_buf() });
        };
        let target = self.dest_root.join(rendered);

        let scratch = ScratchFile::new(&target.base_name())?;
        if render_file(self.engine, source, scratch.path(), &target, self.scope)? == 0 {
            return Ok(FileOperation::Skip { source: source.to_path_buf() });
        }

        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }

        if !target.exists() {
            copy_file(scratch.path(), &target)?;
            return Ok(FileOperation::Copy { source: source.to_path_buf(), target });
        }

        let outcome =
            merge_file(&target, scratch.path(), self.merge_strategy, self.conflict_strategy)?;
        Ok(FileOperation::Merge { source: source.to_path_buf(), target, outcome })
    }
}
