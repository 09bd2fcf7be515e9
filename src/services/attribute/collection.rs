use super::FieldReader;
use crate::error::AttributeError;
use crate::models::collection::{AlarmTypes, CollectionPolicy, Rgba};

impl CollectionPolicy {
    /// `<enabled> <standard> <keepFormat> <hasColor> [R G B A]`
    pub fn serialized(&self) -> String {
        let mut text = format!(
            "{} {} {} {}",
            self.enabled_types().bits(),
            self.standard_types().bits(),
            u8::from(self.keep_legacy_format()),
            u8::from(self.background_color().is_some()),
        );
        if let Some(color) = self.background_color() {
            text.push_str(&format!(" {} {} {} {}", color.r, color.g, color.b, color.a));
        }
        text
    }

    /// Decode a policy, falling back to defaults on malformed input.
    pub fn deserialize(blob: &str) -> Self {
        Self::try_deserialize(blob).unwrap_or_else(|err| {
            log::warn!("Resetting collection attribute '{}': {}", blob, err);
            Self::default()
        })
    }

    /// Decode a policy, reporting the first malformed field.
    pub fn try_deserialize(blob: &str) -> Result<Self, AttributeError> {
        let mut policy = CollectionPolicy::default();
        let mut fields = FieldReader::new(blob);
        let all = AlarmTypes::ALL_BITS as i64;

        let Some(enabled) = fields.next_bitmask(all)? else {
            return Ok(policy);
        };
        policy.set_enabled_types(types(enabled));

        let Some(standard) = fields.next_bitmask(all)? else {
            return Ok(policy);
        };
        policy.set_standard_types(types(standard));

        let Some(keep) = fields.next_flag()? else {
            return Ok(policy);
        };
        policy.set_keep_legacy_format(keep);

        let Some(has_color) = fields.next_flag()? else {
            return Ok(policy);
        };
        if has_color && fields.remaining() >= 4 {
            let mut channels = [0u8; 4];
            for channel in channels.iter_mut() {
                *channel = fields.next_in_range::<u8>()?.unwrap_or_default();
            }
            let [r, g, b, a] = channels;
            policy.set_background_color(Some(Rgba::new(r, g, b, a)));
        }

        Ok(policy)
    }
}

fn types(bits: i64) -> AlarmTypes {
    u32::try_from(bits)
        .ok()
        .and_then(AlarmTypes::from_bits)
        .unwrap_or_default()
}
