//! `WriterInfo` (§3): identifies the writing application and, when
//! encrypting, the cryptographic context to attach.

use mxf_core::ids::InstanceUid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSetType {
    MxfInterop,
    MxfSmpte,
}

#[derive(Debug, Clone)]
pub struct WriterInfo {
    pub product_uuid: InstanceUid,
    pub asset_uuid: InstanceUid,
    pub context_id: InstanceUid,
    pub cryptographic_key_id: InstanceUid,
    pub encrypted_essence: bool,
    pub uses_hmac: bool,
    pub label_set_type: LabelSetType,
    pub product_version: String,
    pub company_name: String,
    pub product_name: String,
    /// RFC 5646 language tag (e.g. `"en-US"`), surfaced at CLI level for
    /// TimedText/IAB descriptors. Present in `original_source/AS_DCP.h`'s
    /// `WriterInfo`, dropped from the distilled spec's prose.
    pub language: Option<String>,
}

impl WriterInfo {
    pub fn new(product_uuid: InstanceUid, company_name: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            product_uuid,
            asset_uuid: InstanceUid::nil(),
            context_id: InstanceUid::nil(),
            cryptographic_key_id: InstanceUid::nil(),
            encrypted_essence: false,
            uses_hmac: false,
            label_set_type: LabelSetType::MxfSmpte,
            product_version: "0.1.0".to_string(),
            company_name: company_name.into(),
            product_name: product_name.into(),
            language: None,
        }
    }
}
