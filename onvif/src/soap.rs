use base64::{prelude::BASE64_STANDARD, Engine};
use quick_xml::{
    events::{BytesDecl, BytesStart, BytesText, Event},
    Writer,
};
use sha1::{Digest, Sha1};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub const SOAP_ENV: &str = "http://www.w3.org/2003/05/soap-envelope";
const NS_WSSE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const NS_WSU: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_DIGEST: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const BASE64_BINARY: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// Namespace declarations in form of (`xmlns:prefix`, uri)
pub type Namespaces = &'static [(&'static str, &'static str)];

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// WS-Security UsernameToken with digested password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameToken {
    pub user: String,
    pub digest: String,
    pub nonce: String,
    pub created: String,
}

impl UsernameToken {
    pub fn new(
        credentials: &Credentials,
        nonce: [u8; 16],
        created: OffsetDateTime,
    ) -> anyhow::Result<Self> {
        let created = created
            .to_offset(time::UtcOffset::UTC)
            .replace_nanosecond(0)?
            .format(&Rfc3339)?;
        let digest = Self::password_digest(&nonce, &created, &credentials.password);
        Ok(Self {
            user: credentials.user.clone(),
            digest,
            nonce: BASE64_STANDARD.encode(nonce),
            created,
        })
    }

    /// Token with random nonce created at current time
    pub fn generate(credentials: &Credentials) -> anyhow::Result<Self> {
        Self::new(credentials, rand::random(), OffsetDateTime::now_utc())
    }

    /// `base64(sha1(nonce + created + password))`
    pub fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
        let mut sha = Sha1::new();
        sha.update(nonce);
        sha.update(created.as_bytes());
        sha.update(password.as_bytes());
        BASE64_STANDARD.encode(sha.finalize())
    }

    fn write_xml(&self, w: &mut Writer<Vec<u8>>) -> anyhow::Result<()> {
        let header = BytesStart::new("s:Header");
        let header_end = header.to_end().into_owned();
        w.write_event(Event::Start(header))?;

        let security = BytesStart::new("wsse:Security").with_attributes([
            ("s:mustUnderstand", "1"),
            ("xmlns:wsse", NS_WSSE),
            ("xmlns:wsu", NS_WSU),
        ]);
        let security_end = security.to_end().into_owned();
        w.write_event(Event::Start(security))?;

        let token = BytesStart::new("wsse:UsernameToken");
        let token_end = token.to_end().into_owned();
        w.write_event(Event::Start(token))?;
        w.create_element("wsse:Username")
            .write_text_content(BytesText::new(&self.user))?;
        w.create_element("wsse:Password")
            .with_attribute(("Type", PASSWORD_DIGEST))
            .write_text_content(BytesText::new(&self.digest))?;
        w.create_element("wsse:Nonce")
            .with_attribute(("EncodingType", BASE64_BINARY))
            .write_text_content(BytesText::new(&self.nonce))?;
        w.create_element("wsu:Created")
            .write_text_content(BytesText::new(&self.created))?;
        w.write_event(Event::End(token_end))?;

        w.write_event(Event::End(security_end))?;
        w.write_event(Event::End(header_end))?;
        Ok(())
    }
}

/// Request for the device service.
///
/// `body` is an already serialized xml fragment that uses prefixes declared in `namespaces`.
#[derive(Debug, Clone)]
pub struct SoapRequest {
    pub body: String,
    pub namespaces: Namespaces,
    pub credentials: Option<Credentials>,
}

impl SoapRequest {
    pub fn new(body: impl Into<String>, namespaces: Namespaces) -> Self {
        Self {
            body: body.into(),
            namespaces,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Name of the first element in the body, used for logging
    pub fn action_name(&self) -> &str {
        let body = self.body.trim_start().trim_start_matches('<');
        let end = body
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(body.len());
        let name = &body[..end];
        name.split_once(':').map_or(name, |(_, local)| local)
    }

    pub fn into_xml(&self) -> anyhow::Result<String> {
        let token = self
            .credentials
            .as_ref()
            .map(UsernameToken::generate)
            .transpose()?;
        self.write_envelope(token.as_ref())
    }

    pub fn write_envelope(&self, token: Option<&UsernameToken>) -> anyhow::Result<String> {
        let mut w = Writer::new(Vec::new());
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let envelope = BytesStart::new("s:Envelope")
            .with_attributes([("xmlns:s", SOAP_ENV)])
            .with_attributes(self.namespaces.iter().copied());
        let envelope_end = envelope.to_end().into_owned();
        w.write_event(Event::Start(envelope))?;

        if let Some(token) = token {
            token.write_xml(&mut w)?;
        }

        let body = BytesStart::new("s:Body");
        let body_end = body.to_end().into_owned();
        w.write_event(Event::Start(body))?;
        w.write_event(Event::Text(BytesText::from_escaped(self.body.as_str())))?;
        w.write_event(Event::End(body_end))?;

        w.write_event(Event::End(envelope_end))?;
        Ok(String::from_utf8(w.into_inner())?)
    }
}
