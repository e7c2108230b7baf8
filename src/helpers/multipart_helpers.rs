use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::database::db::AppError;
use crate::helpers::models::{DocumentSlot, ProfileSubmission, TextRejection, UploadedFile};

/// Largest text value kept from a form part.
pub const MAX_TEXT_PART_BYTES: usize = 8 * 1024;
/// The profile form has 11 parts; a few spare for client quirks.
pub const MAX_PARTS: usize = 16;

/// Largest file part buffered in memory; anything bigger is cut off and flagged.
pub fn max_file_part_bytes() -> usize {
    DocumentSlot::ALL
        .iter()
        .map(|slot| slot.max_kilobytes() * 1024)
        .max()
        .unwrap_or(0)
}

/// Upper bound on everything buffered for one form.
pub fn max_submission_bytes() -> usize {
    DocumentSlot::ALL
        .iter()
        .map(|slot| slot.max_kilobytes() * 1024)
        .sum::<usize>()
        + MAX_PARTS * MAX_TEXT_PART_BYTES
}

/// Collects a multipart profile form. Parts with a filename become uploads,
/// everything else is read as a text field. Text parts that are too long or
/// not UTF-8 are recorded in `rejected` rather than kept.
pub async fn read_profile_submission(mut payload: Multipart) -> Result<ProfileSubmission, AppError> {
    let mut submission = ProfileSubmission::default();
    let mut parts = 0;
    let mut buffered = 0;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::MultipartError(e.to_string()))?;

        parts += 1;
        if parts > MAX_PARTS {
            return Err(AppError::MultipartError(format!(
                "form has more than {} parts",
                MAX_PARTS
            )));
        }

        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());
        let limit = if file_name.is_some() {
            max_file_part_bytes()
        } else {
            MAX_TEXT_PART_BYTES
        };

        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::MultipartError(e.to_string()))?;
            let room = limit.saturating_sub(bytes.len());
            if chunk.len() > room {
                truncated = true;
            }
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        buffered += bytes.len();
        if buffered > max_submission_bytes() {
            return Err(AppError::MultipartError(format!(
                "form is larger than {} bytes",
                max_submission_bytes()
            )));
        }

        if file_name.is_some() {
            submission.files.insert(
                name.clone(),
                UploadedFile {
                    field_name: name,
                    file_name,
                    content_type,
                    bytes,
                    truncated,
                },
            );
        } else if truncated {
            submission.fields.remove(&name);
            submission.rejected.insert(name, TextRejection::TooLong);
        } else {
            match String::from_utf8(bytes) {
                Ok(text) => {
                    submission.rejected.remove(&name);
                    submission.fields.insert(name, text);
                }
                Err(_) => {
                    submission.fields.remove(&name);
                    submission.rejected.insert(name, TextRejection::NotUtf8);
                }
            }
        }
    }

    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_cover_every_document_slot() {
        assert_eq!(max_file_part_bytes(), 2048 * 1024);
        assert_eq!(
            max_submission_bytes(),
            (2048 + 2048 + 1024) * 1024 + MAX_PARTS * MAX_TEXT_PART_BYTES
        );
    }
}
