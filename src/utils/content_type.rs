use super::object_key::split_filename;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve a media type from the filename extension (case-insensitive).
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn content_type_for(filename: &str) -> &'static str {
    let Some(extension) = split_filename(filename).1 else {
        return OCTET_STREAM;
    };

    match extension.to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        // Video
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        // Text
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        // Archives
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        "7z" => "application/x-7z-compressed",
        _ => OCTET_STREAM,
    }
}
