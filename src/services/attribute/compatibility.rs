use super::FieldReader;
use crate::error::AttributeError;
use crate::models::collection::{Compatibility, CompatibilityAttribute};

impl CompatibilityAttribute {
    /// `<compatibilityBitmask> <formatVersion>`
    pub fn serialized(&self) -> String {
        format!("{} {}", self.compatibility.bits(), self.version)
    }

    /// Decode the attribute, falling back to (Incompatible, IncompatibleFormat).
    pub fn deserialize(blob: &str) -> Self {
        Self::try_deserialize(blob).unwrap_or_else(|err| {
            log::warn!("Resetting compatibility attribute '{}': {}", blob, err);
            Self::default()
        })
    }

    pub fn try_deserialize(blob: &str) -> Result<Self, AttributeError> {
        let mut attribute = CompatibilityAttribute::default();
        let mut fields = FieldReader::new(blob);

        let field = fields.index();
        let Some(bits) = fields.next_bitmask(Compatibility::ALL_BITS)? else {
            return Ok(attribute);
        };
        attribute.compatibility =
            Compatibility::from_bits(bits).ok_or(AttributeError::UnknownBits { field, bits })?;

        if let Some(version) = fields.next_in_range::<i32>()? {
            attribute.version = version;
        }

        Ok(attribute)
    }
}
