use std::str::FromStr;

use crate::{
    decode::decode_document,
    value::{PathNotFound, Value},
};

/// Decoded SOAP reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    document: Value,
}

impl Envelope {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn from_xml(raw_xml: &str) -> anyhow::Result<Self> {
        Ok(Self::new(decode_document(raw_xml)?))
    }

    pub fn value_for_path(&self, path: &str) -> Result<&Value, PathNotFound> {
        self.document.value_for_path(path)
    }

    pub fn values_for_path(&self, path: &str) -> Result<Vec<&Value>, PathNotFound> {
        self.document.values_for_path(path)
    }

    pub fn value_for_path_string(&self, path: &str) -> String {
        self.document.value_for_path_string(path)
    }
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl FromStr for Envelope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xml(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Envelope;

    #[test]
    fn navigate_decoded_reply() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope"
    xmlns:tds="http://www.onvif.org/ver10/device/wsdl"
    xmlns:tt="http://www.onvif.org/ver10/schema">
  <SOAP-ENV:Body>
    <tds:GetScopesResponse>
      <tds:Scopes>
        <tt:ScopeDef>Fixed</tt:ScopeDef>
        <tt:ScopeItem>onvif://www.onvif.org/type/video_encoder</tt:ScopeItem>
      </tds:Scopes>
      <tds:Scopes>
        <tt:ScopeDef>Configurable</tt:ScopeDef>
        <tt:ScopeItem>onvif://www.onvif.org/name/IPCAM</tt:ScopeItem>
      </tds:Scopes>
    </tds:GetScopesResponse>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;
        let envelope: Envelope = raw.parse().unwrap();
        let scopes = envelope
            .values_for_path("Envelope.Body.GetScopesResponse.Scopes")
            .unwrap();
        assert_eq!(scopes.len(), 2);
        assert_eq!(
            envelope.value_for_path_string("Envelope.Body.GetScopesResponse.Scopes.ScopeItem"),
            "onvif://www.onvif.org/type/video_encoder"
        );
        assert!(envelope
            .value_for_path("Envelope.Body.GetDNSResponse")
            .is_err());
    }
}
