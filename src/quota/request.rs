// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use serde::Deserializer;
use serde_derive::Deserialize;
use strum::VariantArray;

use crate::{
    errors::{QuotaError, QuotaResult},
    quota::{
        magnitude::parse_limit,
        types::{LimitField, RequestedLimits, Subject, SubjectType},
    },
};

/// Accept a parameter given either as a string or as a bare JSON number.
/// Automation engines pass numeric YAML values through as numbers.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        String(String),
        Integer(i64),
        Float(f64),
    }

    let value = <Option<Text> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.map(|text| match text {
        Text::String(s) => s,
        Text::Integer(i) => i.to_string(),
        Text::Float(f) => f.to_string(),
    }))
}

/// Parameters as the caller supplied them, before any validation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct QuotaParams {
    #[serde(default)]
    pub filesystem: Option<String>,
    #[serde(rename = "type", default)]
    pub subject_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub blocks_soft: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub blocks_hard: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub inodes_soft: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub inodes_hard: Option<String>,
    #[serde(rename = "_ansible_check_mode", default)]
    pub check_mode: bool,
}

/// A validated request, with every requested limit in base units.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuotaRequest {
    pub filesystem: String,
    pub subject: Subject,
    pub limits: RequestedLimits,
    pub check_mode: bool,
}

fn required<'a>(value: Option<&'a String>, name: &str) -> QuotaResult<&'a str> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(QuotaError::InvalidRequest(format!(
            "missing required argument: {name}"
        ))),
    }
}

impl QuotaParams {
    /// The value supplied for a limit, if any.
    pub fn limit(&self, field: LimitField) -> Option<&str> {
        match field {
            LimitField::BlocksSoft => self.blocks_soft.as_deref(),
            LimitField::BlocksHard => self.blocks_hard.as_deref(),
            LimitField::InodesSoft => self.inodes_soft.as_deref(),
            LimitField::InodesHard => self.inodes_hard.as_deref(),
        }
    }

    /// Check that the required parameters are present and well formed and
    /// convert every supplied limit to base units.
    pub fn validate(&self) -> QuotaResult<QuotaRequest> {
        let filesystem = required(self.filesystem.as_ref(), "filesystem")?;
        let subject_type = required(self.subject_type.as_ref(), "type")?;
        let name = required(self.name.as_ref(), "name")?;

        let kind = SubjectType::from_str(subject_type).map_err(|_| {
            let choices = SubjectType::VARIANTS
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>();
            QuotaError::InvalidRequest(format!(
                "value of type must be one of: {}, got: {subject_type}",
                choices.join(", ")
            ))
        })?;

        let mut limits = RequestedLimits::default();
        for field in LimitField::VARIANTS {
            if let Some(value) = self.limit(*field) {
                limits.set(*field, parse_limit(*field, value)?);
            }
        }

        Ok(QuotaRequest {
            filesystem: filesystem.to_owned(),
            subject: Subject::new(kind, name),
            limits,
            check_mode: self.check_mode,
        })
    }
}
