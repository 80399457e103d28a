use crate::config::KeyStrategy;
use uuid::Uuid;

/// Length of the random suffix appended by [`KeyStrategy::Unique`]
const RANDOM_SUFFIX_LEN: usize = 12;

/// Returns the last path segment after `/`.
pub fn trailing_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Splits an uploaded filename into its base name and extension.
///
/// Any directory component is dropped first; the extension is whatever
/// follows the last `.` of the remaining segment.
pub fn split_filename(filename: &str) -> (&str, Option<&str>) {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rsplit_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (name, None),
    }
}

/// Last 8 digits of the millisecond timestamp, or all of it when it has 10 digits or fewer.
pub fn short_timestamp(epoch_millis: i64) -> String {
    let timestamp = epoch_millis.to_string();
    if timestamp.len() > 10 {
        timestamp[timestamp.len() - 8..].to_string()
    } else {
        timestamp
    }
}

/// Builds the storage key for an upload received at `epoch_millis`.
pub fn build_object_key(filename: &str, epoch_millis: i64, strategy: KeyStrategy) -> String {
    let (base, extension) = split_filename(filename);
    let mut key = format!("{}_{}", base, short_timestamp(epoch_millis));

    if strategy == KeyStrategy::Unique {
        let random = Uuid::new_v4().simple().to_string();
        key.push('_');
        key.push_str(&random[..RANDOM_SUFFIX_LEN]);
    }

    if let Some(ext) = extension {
        key.push('.');
        key.push_str(ext);
    }

    key
}
