use uuid::Uuid;

use crate::database::db::{AppError, Repository};
use crate::helpers::models::{DocumentSlot, ProfileSubmission};
use crate::helpers::validation_helpers::{
    validate_profile_documents, validate_profile_fields, FieldErrors, NIK_TAKEN, PHONE_TAKEN,
};
use crate::models::models::{ProfilePatch, UserProfile};
use crate::service::storage::FileStorage;

pub const PROFILE_SAVED: &str =
    "Profile updated successfully. Verification is pending admin approval.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Full submission; every field and document is required.
    Store,
    /// Partial submission when a profile exists, full otherwise.
    Update,
}

/// Validates and upserts the caller's profile, writing uploaded documents to
/// storage. Stored files are removed again if the row cannot be written.
pub fn save_profile(
    db: &dyn Repository,
    storage: &dyn FileStorage,
    user_id: Uuid,
    submission: &ProfileSubmission,
    mode: SaveMode,
) -> Result<UserProfile, AppError> {
    let existing = db.get_profile_by_user_id(user_id)?;
    let require_all = mode == SaveMode::Store || existing.is_none();
    let own_id = existing.as_ref().map(|p| p.id);

    let (mut patch, mut errors) = validate_profile_fields(submission, require_all);
    let (documents, document_errors) = validate_profile_documents(submission, require_all);
    errors.merge(document_errors);
    check_uniqueness(db, &patch, own_id, &mut errors)?;
    errors.into_result(())?;

    let mut stored = Vec::with_capacity(documents.len());
    for (slot, kind, upload) in documents {
        let path = match storage.store(slot.directory(), kind.extension(), &upload.bytes) {
            Ok(path) => path,
            Err(e) => {
                discard(storage, &stored);
                return Err(e);
            }
        };
        stored.push(path.clone());
        match slot {
            DocumentSlot::KtpPhoto => patch.ktp_photo = Some(path),
            DocumentSlot::SelfiePhoto => patch.selfie_photo = Some(path),
            DocumentSlot::Signature => patch.signature = Some(path),
        }
    }

    let (saved, previous) = match upsert(db, existing, user_id, &patch) {
        Ok(written) => written,
        Err(e) => {
            discard(storage, &stored);
            return Err(e);
        }
    };

    if let Some(previous) = &previous {
        discard(storage, &previous.superseded_documents(&patch));
    }

    log::info!("Profile {} saved for user {}", saved.id, user_id);
    Ok(saved)
}

/// Writes the patch, returning the saved row and the row it replaced.
fn upsert(
    db: &dyn Repository,
    existing: Option<UserProfile>,
    user_id: Uuid,
    patch: &ProfilePatch,
) -> Result<(UserProfile, Option<UserProfile>), AppError> {
    if let Some(profile) = existing {
        let saved = db.update_profile(profile.id, patch)?;
        return Ok((saved, Some(profile)));
    }

    let new_profile = patch
        .clone()
        .into_new_profile(Uuid::new_v4(), user_id)
        .ok_or_else(|| AppError::field("phone", "Phone number is required."))?;

    match db.create_profile(new_profile) {
        Ok(saved) => Ok((saved, None)),
        // Another first save for this user got in between the read and the insert.
        Err(AppError::ProfileExists) => {
            let current = db
                .get_profile_by_user_id(user_id)?
                .ok_or(AppError::NotFound("profile"))?;
            log::info!("Profile for user {} was created concurrently; updating it", user_id);
            let saved = db.update_profile(current.id, patch)?;
            Ok((saved, Some(current)))
        }
        Err(e) => Err(e),
    }
}

fn check_uniqueness(
    db: &dyn Repository,
    patch: &ProfilePatch,
    own_id: Option<Uuid>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if let Some(phone) = &patch.phone {
        if db.phone_taken(phone, own_id)? {
            errors.add("phone", PHONE_TAKEN);
        }
    }
    if let Some(nik) = &patch.nik {
        if db.nik_taken(nik, own_id)? {
            errors.add("nik", NIK_TAKEN);
        }
    }
    Ok(())
}

fn discard(storage: &dyn FileStorage, paths: &[String]) {
    for path in paths {
        if let Err(e) = storage.delete(path) {
            log::warn!("Could not delete stored file {}: {}", path, e);
        }
    }
}
