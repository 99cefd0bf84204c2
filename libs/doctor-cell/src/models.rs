use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use shared_backend::BackendError;
use shared_models::error::AppError;

// ==============================================================================
// CORE DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorAddress {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

/// A doctor as the clinic backend returns it in the admin roster and the
/// doctor's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub fees: f64,
    #[serde(default, deserialize_with = "lenient_address")]
    pub address: DoctorAddress,
    #[serde(default)]
    pub available: bool,
}

impl DoctorRecord {
    pub fn has_speciality(&self, speciality: &str) -> bool {
        self.speciality.eq_ignore_ascii_case(speciality.trim())
    }
}

// Experience arrives as either "4 Years" or a bare number depending on which
// form created the doctor.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// Older records carry the address as a JSON-encoded string.
fn lenient_address<'de, D>(deserializer: D) -> Result<DoctorAddress, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => serde_json::from_str(&s).unwrap_or_default(),
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => DoctorAddress::default(),
    })
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub fees: f64,
    pub address: DoctorAddress,
    pub about: String,
    pub experience: String,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.name.trim().is_empty()
            || self.address.line1.trim().is_empty()
            || self.about.trim().is_empty()
            || self.experience.trim().is_empty()
        {
            return Err(DoctorError::ValidationError(
                "Please fill in all required profile fields.".to_string(),
            ));
        }

        if !self.fees.is_finite() || self.fees <= 0.0 {
            return Err(DoctorError::ValidationError("Fees must be a positive number.".to_string()));
        }

        match self.experience.trim().parse::<f64>() {
            Ok(years) if years >= 0.0 => Ok(()),
            _ => Err(DoctorError::ValidationError(
                "Experience must be a non-negative number.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileImage {
    pub file_name: String,
    pub content_type: String,
    /// Raw bytes read from the multipart upload.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub experience: String,
    pub fees: f64,
    pub about: String,
    pub speciality: String,
    pub degree: String,
    pub address: DoctorAddress,
    #[serde(skip)]
    pub image: Option<ProfileImage>,
}

impl NewDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.image.as_ref().map_or(true, |image| image.bytes.is_empty()) {
            return Err(DoctorError::ValidationError("Please select a doctor's picture.".to_string()));
        }

        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("experience", &self.experience),
            ("about", &self.about),
            ("speciality", &self.speciality),
            ("degree", &self.degree),
            ("address line 1", &self.address.line1),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(DoctorError::ValidationError(format!("Missing required field: {}", field)));
        }

        if !self.email.contains('@') {
            return Err(DoctorError::ValidationError("Please enter a valid email.".to_string()));
        }

        if !self.fees.is_finite() || self.fees <= 0.0 {
            return Err(DoctorError::ValidationError("Fees must be a positive number.".to_string()));
        }

        Ok(())
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DoctorError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Doctor profile not loaded")]
    ProfileMissing,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::ProfileMissing => AppError::NotFound(err.to_string()),
            DoctorError::Backend(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn profile_update() -> UpdateProfileRequest {
        UpdateProfileRequest {
            name: "Dr. Meera Iyer".to_string(),
            fees: 600.0,
            address: DoctorAddress {
                line1: "4 MG Road".to_string(),
                line2: String::new(),
            },
            about: "Paediatric care".to_string(),
            experience: "6".to_string(),
        }
    }

    #[test]
    fn doctor_record_tolerates_backend_variations() {
        let doctor: DoctorRecord = serde_json::from_value(json!({
            "_id": "d1",
            "name": "Dr. Sen",
            "speciality": "Neurologist",
            "experience": 7,
            "fees": 800,
            "address": "{\"line1\":\"1 Park St\",\"line2\":\"Kolkata\"}",
            "available": true
        }))
        .unwrap();

        assert_eq!(doctor.experience.as_deref(), Some("7"));
        assert_eq!(doctor.address.line1, "1 Park St");
        assert!(doctor.has_speciality("neurologist"));
    }

    #[test]
    fn profile_update_requires_positive_fees() {
        let mut request = profile_update();
        assert!(request.validate().is_ok());

        request.fees = 0.0;
        assert_matches!(request.validate(), Err(DoctorError::ValidationError(msg)) if msg.contains("Fees"));
    }

    #[test]
    fn profile_update_rejects_negative_or_textual_experience() {
        let mut request = profile_update();
        request.experience = "-1".to_string();
        assert_matches!(request.validate(), Err(DoctorError::ValidationError(_)));

        request.experience = "lots".to_string();
        assert_matches!(request.validate(), Err(DoctorError::ValidationError(_)));
    }

    #[test]
    fn new_doctor_requires_picture() {
        let request = NewDoctorRequest {
            name: "Dr. Khan".to_string(),
            email: "khan@clinic.test".to_string(),
            password: "changeme123".to_string(),
            experience: "3 Years".to_string(),
            fees: 400.0,
            about: "General medicine".to_string(),
            speciality: "General physician".to_string(),
            degree: "MBBS".to_string(),
            address: DoctorAddress {
                line1: "2 Lake View".to_string(),
                line2: String::new(),
            },
            image: None,
        };

        assert_matches!(request.validate(), Err(DoctorError::ValidationError(msg)) if msg.contains("picture"));
    }
}
