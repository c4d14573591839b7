//! Configuration merging and precedence handling.

use crate::config::schema::Config;

/// Merges configuration layers.
///
/// # Examples
///
/// ```
/// use wayplan::config::{Config, ConfigMerger};
///
/// let low = Config { log_mode: Some("quiet".into()), ..Default::default() };
/// let high = Config { log_mode: Some("verbose".into()), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.log_mode.as_deref(), Some("verbose"));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge `source` into `target`; values set in `source` win.
    ///
    /// Nested sections merge field by field.
    pub fn merge_into(target: &mut Config, source: &Config) {
        if let Some(db) = &source.database {
            let target_db = target.database.get_or_insert_with(Default::default);
            if db.path.is_some() {
                target_db.path.clone_from(&db.path);
            }
            if db.busy_timeout_ms.is_some() {
                target_db.busy_timeout_ms = db.busy_timeout_ms;
            }
        }

        if let Some(pagination) = &source.pagination {
            let target_pagination = target.pagination.get_or_insert_with(Default::default);
            if pagination.default_page_size.is_some() {
                target_pagination.default_page_size = pagination.default_page_size;
            }
        }

        if source.log_mode.is_some() {
            target.log_mode.clone_from(&source.log_mode);
        }
    }
}
