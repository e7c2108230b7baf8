use std::collections::BTreeMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::db::AppError;
use crate::helpers::models::{
    DocumentSlot, ImageKind, ProfileSubmission, TextRejection, UploadedFile,
};
use crate::models::models::{LoanApplicationSchema, ProfilePatch, WithdrawalSchema};

pub const LOAN_MIN_AMOUNT: i64 = 500_000;
pub const LOAN_MAX_AMOUNT: i64 = 10_000_000;
pub const LOAN_TERMS: [i32; 4] = [1, 3, 6, 12];
pub const WITHDRAWAL_MIN_AMOUNT: i64 = 50_000;
pub const MIN_MONTHLY_INCOME: i64 = 1_000_000;

pub const PHONE_TAKEN: &str = "This phone number is already registered.";
pub const NIK_TAKEN: &str = "This NIK is already registered.";

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^08[0-9]{8,11}$").expect("phone pattern is valid"));

/// Field name -> first error message for that field.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records `message` unless the field already has an error.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(&field, message);
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, AppError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Parses a numeric form value the way a lenient "numeric" rule would:
/// plain decimals and scientific notation are both accepted.
pub fn parse_numeric(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

pub fn validate_loan_amount(raw: Option<&str>) -> Result<Decimal, String> {
    let raw = raw
        .filter(|v| !v.trim().is_empty())
        .ok_or("Loan amount is required.")?;
    let amount = parse_numeric(raw).ok_or("Loan amount must be a number.")?;

    if amount < Decimal::from(LOAN_MIN_AMOUNT) {
        return Err("Minimum loan amount is Rp 500,000.".to_string());
    }
    if amount > Decimal::from(LOAN_MAX_AMOUNT) {
        return Err("Maximum loan amount is Rp 10,000,000.".to_string());
    }
    Ok(amount.round_dp(2))
}

pub fn validate_term_months(raw: Option<&str>) -> Result<i32, String> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or("Loan term is required.")?;
    let term: i32 = raw.parse().map_err(|_| "Loan term must be an integer.")?;

    if !LOAN_TERMS.contains(&term) {
        return Err("Invalid loan term selected.".to_string());
    }
    Ok(term)
}

pub fn validate_loan_application(form: &LoanApplicationSchema) -> Result<(Decimal, i32), AppError> {
    let mut errors = FieldErrors::default();

    let amount = validate_loan_amount(form.amount.as_deref())
        .map_err(|e| errors.add("amount", e))
        .ok();
    let term = validate_term_months(form.term_months.as_deref())
        .map_err(|e| errors.add("term_months", e))
        .ok();

    match (amount, term) {
        (Some(amount), Some(term)) => errors.into_result((amount, term)),
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn validate_withdrawal_amount(raw: Option<&str>) -> Result<Decimal, String> {
    let raw = raw
        .filter(|v| !v.trim().is_empty())
        .ok_or("Withdrawal amount is required.")?;
    let amount = parse_numeric(raw).ok_or("Withdrawal amount must be a number.")?;

    if amount < Decimal::from(WITHDRAWAL_MIN_AMOUNT) {
        return Err("Minimum withdrawal amount is Rp 50,000.".to_string());
    }
    Ok(amount.round_dp(2))
}

pub fn validate_verification_code(raw: Option<&str>) -> Result<String, String> {
    let code = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or("Verification code is required.")?;
    let length = code.chars().count();

    if length < 4 {
        return Err("Verification code must be at least 4 characters.".to_string());
    }
    if length > 8 {
        return Err("Verification code cannot exceed 8 characters.".to_string());
    }
    Ok(code.to_string())
}

pub fn validate_withdrawal(form: &WithdrawalSchema) -> Result<(Decimal, String), AppError> {
    let mut errors = FieldErrors::default();

    let amount = validate_withdrawal_amount(form.amount.as_deref())
        .map_err(|e| errors.add("amount", e))
        .ok();
    let code = validate_verification_code(form.verification_code.as_deref())
        .map_err(|e| errors.add("verification_code", e))
        .ok();

    match (amount, code) {
        (Some(amount), Some(code)) => errors.into_result((amount, code)),
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn validate_phone(phone: &str) -> Result<String, String> {
    if !PHONE_PATTERN.is_match(phone) {
        return Err("Phone number must start with 08 and be 10-13 digits long.".to_string());
    }
    Ok(phone.to_string())
}

pub fn validate_nik(nik: &str) -> Result<String, String> {
    if nik.chars().count() != 16 {
        return Err("NIK must be exactly 16 digits.".to_string());
    }
    Ok(nik.to_string())
}

pub fn validate_monthly_income(raw: &str) -> Result<Decimal, String> {
    let income = parse_numeric(raw).ok_or("Monthly income must be a number.")?;
    if income < Decimal::from(MIN_MONTHLY_INCOME) {
        return Err("Minimum monthly income is Rp 1,000,000.".to_string());
    }
    Ok(income.round_dp(2))
}

pub fn validate_image(upload: &UploadedFile, slot: DocumentSlot) -> Result<ImageKind, String> {
    let label = document_label(slot);
    let kind = ImageKind::sniff(&upload.bytes).ok_or(format!("{} must be an image.", label))?;

    if upload.truncated || upload.size() > slot.max_kilobytes() * 1024 {
        return Err(format!(
            "{} size cannot exceed {}MB.",
            label,
            slot.max_kilobytes() / 1024
        ));
    }
    Ok(kind)
}

fn document_label(slot: DocumentSlot) -> &'static str {
    match slot {
        DocumentSlot::KtpPhoto => "KTP photo",
        DocumentSlot::SelfiePhoto => "Selfie photo",
        DocumentSlot::Signature => "Signature",
    }
}

fn document_required_message(slot: DocumentSlot) -> &'static str {
    match slot {
        DocumentSlot::KtpPhoto => "KTP photo is required.",
        DocumentSlot::SelfiePhoto => "Selfie with KTP is required.",
        DocumentSlot::Signature => "Digital signature is required.",
    }
}

struct TextRule {
    field: &'static str,
    label: &'static str,
    required: &'static str,
    max: Option<usize>,
}

const TEXT_RULES: [TextRule; 5] = [
    TextRule {
        field: "full_name",
        label: "Full name",
        required: "Full name is required.",
        max: Some(255),
    },
    TextRule {
        field: "address",
        label: "Address",
        required: "Address is required.",
        max: None,
    },
    TextRule {
        field: "job",
        label: "Job",
        required: "Job information is required.",
        max: Some(255),
    },
    TextRule {
        field: "bank_name",
        label: "Bank name",
        required: "Bank name is required.",
        max: Some(255),
    },
    TextRule {
        field: "bank_account",
        label: "Bank account number",
        required: "Bank account number is required.",
        max: Some(50),
    },
];

fn profile_field_label(field: &str) -> Option<&'static str> {
    match field {
        "phone" => Some("Phone number"),
        "nik" => Some("NIK"),
        "monthly_income" => Some("Monthly income"),
        _ => TEXT_RULES
            .iter()
            .find(|rule| rule.field == field)
            .map(|rule| rule.label),
    }
}

/// Validates the text fields of a profile form into a typed patch. With
/// `require_all` every field must be present; otherwise only supplied fields
/// are checked and everything else stays `None`.
pub fn validate_profile_fields(
    submission: &ProfileSubmission,
    require_all: bool,
) -> (ProfilePatch, FieldErrors) {
    let mut errors = FieldErrors::default();
    let mut patch = ProfilePatch::default();

    for (field, rejection) in &submission.rejected {
        if let Some(label) = profile_field_label(field) {
            match rejection {
                TextRejection::TooLong => errors.add(field, format!("{} is too long.", label)),
                TextRejection::NotUtf8 => {
                    errors.add(field, format!("{} must be valid text.", label))
                }
            }
        }
    }

    match submission.text("phone") {
        Some(phone) => match validate_phone(phone) {
            Ok(phone) => patch.phone = Some(phone),
            Err(e) => errors.add("phone", e),
        },
        None if require_all => errors.add("phone", "Phone number is required."),
        None => {}
    }

    match submission.text("nik") {
        Some(nik) => match validate_nik(nik) {
            Ok(nik) => patch.nik = Some(nik),
            Err(e) => errors.add("nik", e),
        },
        None if require_all => errors.add("nik", "NIK is required."),
        None => {}
    }

    match submission.text("monthly_income") {
        Some(raw) => match validate_monthly_income(raw) {
            Ok(income) => patch.monthly_income = Some(income),
            Err(e) => errors.add("monthly_income", e),
        },
        None if require_all => errors.add("monthly_income", "Monthly income is required."),
        None => {}
    }

    for rule in TEXT_RULES.iter() {
        let value = match submission.text(rule.field) {
            Some(value) => value,
            None => {
                if require_all {
                    errors.add(rule.field, rule.required);
                }
                continue;
            }
        };

        if let Some(max) = rule.max {
            if value.chars().count() > max {
                errors.add(
                    rule.field,
                    format!("{} may not be greater than {} characters.", rule.label, max),
                );
                continue;
            }
        }

        let value = Some(value.to_string());
        match rule.field {
            "full_name" => patch.full_name = value,
            "address" => patch.address = value,
            "job" => patch.job = value,
            "bank_name" => patch.bank_name = value,
            "bank_account" => patch.bank_account = value,
            _ => unreachable!("unknown profile field {}", rule.field),
        }
    }

    (patch, errors)
}

/// Validates the document uploads, returning the accepted files per slot.
pub fn validate_profile_documents<'a>(
    submission: &'a ProfileSubmission,
    require_all: bool,
) -> (Vec<(DocumentSlot, ImageKind, &'a UploadedFile)>, FieldErrors) {
    let mut errors = FieldErrors::default();
    let mut accepted = Vec::new();

    for slot in DocumentSlot::ALL {
        match submission.file(slot.field()) {
            Some(upload) => match validate_image(upload, slot) {
                Ok(kind) => accepted.push((slot, kind, upload)),
                Err(e) => errors.add(slot.field(), e),
            },
            None if require_all => errors.add(slot.field(), document_required_message(slot)),
            None => {}
        }
    }

    (accepted, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(amount: &str, term: &str) -> LoanApplicationSchema {
        LoanApplicationSchema {
            amount: Some(amount.to_string()),
            term_months: Some(term.to_string()),
        }
    }

    fn png(size: usize) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(size.max(8), 0);
        bytes
    }

    fn upload(field: &str, bytes: Vec<u8>) -> UploadedFile {
        UploadedFile {
            field_name: field.to_string(),
            file_name: Some(format!("{}.png", field)),
            content_type: Some("image/png".to_string()),
            bytes,
            truncated: false,
        }
    }

    #[test]
    fn loan_amount_bounds_are_inclusive() {
        assert_eq!(
            validate_loan_amount(Some("500000")).unwrap(),
            Decimal::from(500_000)
        );
        assert_eq!(
            validate_loan_amount(Some("10000000")).unwrap(),
            Decimal::from(10_000_000)
        );
        assert_eq!(
            validate_loan_amount(Some("499999.99")).unwrap_err(),
            "Minimum loan amount is Rp 500,000."
        );
        assert_eq!(
            validate_loan_amount(Some("10000000.01")).unwrap_err(),
            "Maximum loan amount is Rp 10,000,000."
        );
    }

    #[test]
    fn loan_amount_must_be_numeric_and_present() {
        assert_eq!(
            validate_loan_amount(Some("sejuta")).unwrap_err(),
            "Loan amount must be a number."
        );
        assert_eq!(
            validate_loan_amount(None).unwrap_err(),
            "Loan amount is required."
        );
        assert_eq!(
            validate_loan_amount(Some("1e6")).unwrap(),
            Decimal::from(1_000_000)
        );
    }

    #[test]
    fn only_fixed_terms_are_allowed() {
        for term in LOAN_TERMS {
            assert_eq!(validate_term_months(Some(&term.to_string())).unwrap(), term);
        }
        for bad in ["0", "2", "24", "-1"] {
            assert_eq!(
                validate_term_months(Some(bad)).unwrap_err(),
                "Invalid loan term selected."
            );
        }
        assert!(validate_term_months(Some("6.5")).is_err());
        assert_eq!(
            validate_term_months(None).unwrap_err(),
            "Loan term is required."
        );
    }

    #[test]
    fn loan_form_reports_every_bad_field() {
        match validate_loan_application(&loan("100", "5")) {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains("amount"));
                assert!(errors.contains("term_months"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let (amount, term) = validate_loan_application(&loan("1000000", "6")).unwrap();
        assert_eq!(amount, Decimal::from(1_000_000));
        assert_eq!(term, 6);
    }

    #[test]
    fn withdrawal_rules() {
        assert_eq!(
            validate_withdrawal_amount(Some("49999")).unwrap_err(),
            "Minimum withdrawal amount is Rp 50,000."
        );
        assert!(validate_withdrawal_amount(Some("50000")).is_ok());
        assert_eq!(
            validate_verification_code(Some("123")).unwrap_err(),
            "Verification code must be at least 4 characters."
        );
        assert_eq!(
            validate_verification_code(Some("123456789")).unwrap_err(),
            "Verification code cannot exceed 8 characters."
        );
        assert_eq!(validate_verification_code(Some("ab12")).unwrap(), "ab12");
        assert_eq!(
            validate_verification_code(Some("    ")).unwrap_err(),
            "Verification code is required."
        );
        assert_eq!(validate_verification_code(Some(" ab12 ")).unwrap(), "ab12");

        let form = WithdrawalSchema {
            amount: Some("100000".to_string()),
            verification_code: None,
        };
        match validate_withdrawal(&form) {
            Err(AppError::Validation(errors)) => {
                assert_eq!(
                    errors.get("verification_code"),
                    Some("Verification code is required.")
                );
                assert!(!errors.contains("amount"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn phone_pattern() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("0812345678901").is_ok());
        assert!(validate_phone("081234567").is_err());
        assert!(validate_phone("08123456789012").is_err());
        assert!(validate_phone("+6281234567890").is_err());
        assert!(validate_phone("0912345678").is_err());
    }

    #[test]
    fn nik_is_sixteen_characters() {
        assert!(validate_nik("3171234567890001").is_ok());
        assert!(validate_nik("317123456789000").is_err());
        assert!(validate_nik("31712345678900012").is_err());
    }

    #[test]
    fn monthly_income_minimum() {
        assert!(validate_monthly_income("1000000").is_ok());
        assert_eq!(
            validate_monthly_income("999999").unwrap_err(),
            "Minimum monthly income is Rp 1,000,000."
        );
    }

    #[test]
    fn images_are_sniffed_and_size_checked() {
        let ok = upload("signature", png(1024 * 1024));
        assert_eq!(
            validate_image(&ok, DocumentSlot::Signature).unwrap(),
            ImageKind::Png
        );

        let big = upload("signature", png(1024 * 1024 + 1));
        assert_eq!(
            validate_image(&big, DocumentSlot::Signature).unwrap_err(),
            "Signature size cannot exceed 1MB."
        );
        assert!(validate_image(&big, DocumentSlot::KtpPhoto).is_ok());

        let text = upload("ktp_photo", b"not an image".to_vec());
        assert_eq!(
            validate_image(&text, DocumentSlot::KtpPhoto).unwrap_err(),
            "KTP photo must be an image."
        );
    }

    #[test]
    fn full_profile_requires_every_field() {
        let (patch, errors) = validate_profile_fields(&ProfileSubmission::default(), true);
        assert_eq!(patch, ProfilePatch::default());
        for field in [
            "phone",
            "nik",
            "full_name",
            "address",
            "job",
            "monthly_income",
            "bank_name",
            "bank_account",
        ] {
            assert!(errors.contains(field), "missing error for {}", field);
        }

        let (_, errors) = validate_profile_documents(&ProfileSubmission::default(), true);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("selfie_photo"), Some("Selfie with KTP is required."));
    }

    #[test]
    fn partial_profile_checks_supplied_fields_only() {
        let mut submission = ProfileSubmission::default();
        submission
            .fields
            .insert("job".to_string(), "Pedagang".to_string());
        submission
            .fields
            .insert("bank_account".to_string(), "1".repeat(51));

        let (patch, errors) = validate_profile_fields(&submission, false);
        assert_eq!(patch.job.as_deref(), Some("Pedagang"));
        assert!(patch.phone.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("bank_account"),
            Some("Bank account number may not be greater than 50 characters.")
        );
    }

    #[test]
    fn rejected_text_parts_are_field_errors() {
        let mut submission = ProfileSubmission::default();
        submission
            .rejected
            .insert("address".to_string(), TextRejection::TooLong);
        submission
            .rejected
            .insert("nik".to_string(), TextRejection::NotUtf8);
        submission
            .rejected
            .insert("nickname".to_string(), TextRejection::TooLong);

        let (patch, errors) = validate_profile_fields(&submission, true);
        assert!(patch.address.is_none());
        assert_eq!(errors.get("address"), Some("Address is too long."));
        assert_eq!(errors.get("nik"), Some("NIK must be valid text."));
        assert!(!errors.contains("nickname"));

        let (_, errors) = validate_profile_fields(&submission, false);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn field_errors_keep_first_message() {
        let mut errors = FieldErrors::default();
        errors.add("amount", "first");
        errors.add("amount", "second");
        assert_eq!(errors.get("amount"), Some("first"));
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"amount": "first"})
        );
    }
}
