use rand::Rng;
use std::path::Path;

use crate::error::{AppError, AppResult};

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Store an uploaded avatar under a random hex filename, keeping the
/// original extension. Returns the stored filename.
pub fn save_avatar(uploads_dir: &Path, original_name: &str, bytes: &[u8]) -> AppResult<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AppError::BadRequest("Avatar must be a .png or .jpg image".into()))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(
            "Avatar must be a .png or .jpg image".into(),
        ));
    }

    let mut rng = rand::thread_rng();
    let random: [u8; 8] = rng.gen();
    let filename = format!("{}.{}", hex::encode(random), ext);

    std::fs::create_dir_all(uploads_dir)
        .map_err(|e| AppError::Internal(format!("Failed to create uploads dir: {e}")))?;
    std::fs::write(uploads_dir.join(&filename), bytes)
        .map_err(|e| AppError::Internal(format!("Failed to store avatar: {e}")))?;

    Ok(filename)
}

/// True when a requested media filename is a bare name we could have
/// generated, with no path traversal.
pub fn is_safe_media_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}
