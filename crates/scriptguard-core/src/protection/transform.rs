//! Reversible script encoding and loader template.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::models::ProtectionLevel;

/// Encoded payload plus the loader text that embeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Standard base64 of the script bytes. Stored as the artifact.
    pub artifact: String,
    pub loader_code: String,
}

/// Encode `content` and render the loader.
///
/// Deterministic: equal `(content, level, key_value)` give byte-identical
/// output. The storage path is chosen by the caller, not here.
pub fn transform(content: &str, level: ProtectionLevel, key_value: &str) -> TransformOutput {
    let artifact = STANDARD.encode(content.as_bytes());
    let loader_code = render_loader(&artifact, level, key_value);
    TransformOutput {
        artifact,
        loader_code,
    }
}

/// Inverse of the artifact encoding.
pub fn decode_artifact(artifact: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(artifact)
}

fn render_loader(payload: &str, level: ProtectionLevel, key_value: &str) -> String {
    format!(
        "-- ScriptGuard Encoded Script\n\
         -- Protection Level: {level}\n\
         -- License Key: {key_value}\n\
         \n\
         local function decrypt()\n  return \"{payload}\"\n\
         end\n\
         \n\
         local decrypted = decrypt()\n\
         -- Execute decrypted code\n\
         load(atob(decrypted))()"
    )
}

/// Upper bound on a sanitized name, in bytes. Leaves room for the
/// `{uuid}_` prefix inside a 255-byte path component.
pub const MAX_FILE_NAME_BYTES: usize = 128;

/// Longest suffix kept as an extension when a name is shortened.
const MAX_EXTENSION_BYTES: usize = 16;

/// Keep a user-supplied file name from escaping its storage prefix.
/// Long names are cut on a char boundary, keeping a short extension.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "script".to_string()
    } else {
        cap_length(cleaned)
    }
}

fn cap_length(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_BYTES {
        return name.to_string();
    }
    let extension = name
        .rfind('.')
        .map(|i| &name[i..])
        .filter(|ext| ext.len() <= MAX_EXTENSION_BYTES)
        .unwrap_or("");
    let stem = &name[..name.len() - extension.len()];
    let mut end = (MAX_FILE_NAME_BYTES - extension.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &stem[..end], extension)
}
