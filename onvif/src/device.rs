use std::collections::BTreeMap;

use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    envelope::Envelope,
    error::Result,
    soap::{Credentials, Namespaces, SoapRequest},
    transport::{HttpTransport, Transport},
    value::{as_bool, as_int, as_string, FromValue, Value},
};

pub const DEVICE_NAMESPACES: Namespaces = &[
    ("xmlns:tds", "http://www.onvif.org/ver10/device/wsdl"),
    ("xmlns:tt", "http://www.onvif.org/ver10/schema"),
];

const CAPABILITIES_PATH: &str = "Envelope.Body.GetCapabilitiesResponse.Capabilities";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceInformation {
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    #[serde(rename = "HardwareID")]
    pub hardware_id: String,
}

impl FromValue for DeviceInformation {
    fn from_value(value: &Value) -> Self {
        Self {
            manufacturer: as_string(value.get("Manufacturer")),
            model: as_string(value.get("Model")),
            firmware_version: as_string(value.get("FirmwareVersion")),
            serial_number: as_string(value.get("SerialNumber")),
            hardware_id: as_string(value.get("HardwareId")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemDateAndTime {
    pub date_time_type: String,
    pub daylight_savings: bool,
    pub time_zone: TimeZone,
    #[serde(rename = "UTCDateTime")]
    pub utc_date_time: DateTime,
    pub local_date_time: DateTime,
}

impl SystemDateAndTime {
    /// Device clock in UTC if reported date and time are valid
    pub fn utc(&self) -> Option<OffsetDateTime> {
        self.utc_date_time
            .to_primitive()
            .map(PrimitiveDateTime::assume_utc)
    }
}

impl FromValue for SystemDateAndTime {
    fn from_value(value: &Value) -> Self {
        Self {
            date_time_type: as_string(value.get("DateTimeType")),
            daylight_savings: as_bool(value.get("DaylightSavings")),
            time_zone: value.child("TimeZone"),
            utc_date_time: value.child("UTCDateTime"),
            local_date_time: value.child("LocalDateTime"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeZone {
    #[serde(rename = "TZ")]
    pub tz: String,
}

impl FromValue for TimeZone {
    fn from_value(value: &Value) -> Self {
        Self {
            tz: as_string(value.get("TZ")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

impl DateTime {
    pub fn to_primitive(&self) -> Option<PrimitiveDateTime> {
        let month = time::Month::try_from(u8::try_from(self.date.month).ok()?).ok()?;
        let date = time::Date::from_calendar_date(
            i32::try_from(self.date.year).ok()?,
            month,
            u8::try_from(self.date.day).ok()?,
        )
        .ok()?;
        let time = time::Time::from_hms(
            u8::try_from(self.time.hour).ok()?,
            u8::try_from(self.time.minute).ok()?,
            u8::try_from(self.time.second).ok()?,
        )
        .ok()?;
        Some(PrimitiveDateTime::new(date, time))
    }
}

impl FromValue for DateTime {
    fn from_value(value: &Value) -> Self {
        let date = value.get("Date");
        let time = value.get("Time");
        Self {
            date: Date {
                year: as_int(date.and_then(|d| d.get("Year"))),
                month: as_int(date.and_then(|d| d.get("Month"))),
                day: as_int(date.and_then(|d| d.get("Day"))),
            },
            time: Time {
                hour: as_int(time.and_then(|t| t.get("Hour"))),
                minute: as_int(time.and_then(|t| t.get("Minute"))),
                second: as_int(time.and_then(|t| t.get("Second"))),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Date {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Time {
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkCapabilities {
    #[serde(rename = "DynDNS")]
    pub dyn_dns: bool,
    #[serde(rename = "IPFilter")]
    pub ip_filter: bool,
    #[serde(rename = "IPVersion6")]
    pub ip_version6: bool,
    pub zero_config: bool,
}

impl FromValue for NetworkCapabilities {
    fn from_value(value: &Value) -> Self {
        Self {
            dyn_dns: as_bool(value.get("DynDNS")),
            ip_filter: as_bool(value.get("IPFilter")),
            ip_version6: as_bool(value.get("IPVersion6")),
            zero_config: as_bool(value.get("ZeroConfiguration")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceCapabilities {
    pub network: NetworkCapabilities,
    pub events: BTreeMap<String, bool>,
    pub streaming: BTreeMap<String, bool>,
}

/// Event flags without the service address, `WS` prefix is stripped from flag names
pub fn event_capabilities(value: &Value) -> BTreeMap<String, bool> {
    value
        .as_mapping()
        .into_iter()
        .flatten()
        .filter(|(key, _)| !key.eq_ignore_ascii_case("xaddr"))
        .map(|(key, flag)| {
            let key = key.strip_prefix("WS").unwrap_or(key);
            (key.to_owned(), as_bool(Some(flag)))
        })
        .collect()
}

/// Streaming flags with underscores in names replaced by spaces
pub fn streaming_capabilities(value: &Value) -> BTreeMap<String, bool> {
    value
        .as_mapping()
        .into_iter()
        .flatten()
        .map(|(key, flag)| (key.replace('_', " "), as_bool(Some(flag))))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostnameInformation {
    pub name: String,
    #[serde(rename = "FromDHCP")]
    pub from_dhcp: bool,
}

impl FromValue for HostnameInformation {
    fn from_value(value: &Value) -> Self {
        Self {
            name: as_string(value.get("Name")),
            from_dhcp: as_bool(value.get("FromDHCP")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpAddress {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "IPv4Address")]
    pub ipv4_address: String,
    #[serde(rename = "IPv6Address")]
    pub ipv6_address: String,
}

impl FromValue for IpAddress {
    fn from_value(value: &Value) -> Self {
        Self {
            kind: as_string(value.get("Type")),
            ipv4_address: as_string(value.get("IPv4Address")),
            ipv6_address: as_string(value.get("IPv6Address")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DnsInformation {
    #[serde(rename = "FromDHCP")]
    pub from_dhcp: bool,
    pub search_domain: Vec<String>,
    #[serde(rename = "DNSFromDHCP")]
    pub dns_from_dhcp: Vec<IpAddress>,
    #[serde(rename = "DNSManual")]
    pub dns_manual: Vec<IpAddress>,
}

impl FromValue for DnsInformation {
    fn from_value(value: &Value) -> Self {
        Self {
            from_dhcp: as_bool(value.get("FromDHCP")),
            search_domain: search_domains(value.get("SearchDomain")),
            dns_from_dhcp: ip_addresses(value.get("DNSFromDHCP")),
            dns_manual: ip_addresses(value.get("DNSManual")),
        }
    }
}

/// Search domain is either a single string or a list of them
pub fn search_domains(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Scalar(domain)) => vec![domain.clone()],
        Some(Value::Sequence(domains)) => domains.iter().map(|d| as_string(Some(d))).collect(),
        Some(Value::Mapping(_)) | None => Vec::new(),
    }
}

fn ip_addresses(value: Option<&Value>) -> Vec<IpAddress> {
    value
        .map(Value::as_items)
        .unwrap_or_default()
        .into_iter()
        .filter(|v| v.as_mapping().is_some())
        .map(IpAddress::from_value)
        .collect()
}

/// ONVIF device management service client
#[derive(Debug, Clone)]
pub struct Device<T: Transport = HttpTransport> {
    transport: T,
    credentials: Option<Credentials>,
}

impl Device<HttpTransport> {
    pub fn new(xaddr: impl Into<String>, credentials: Option<Credentials>) -> Result<Self> {
        let transport = HttpTransport::new(xaddr)?;
        Ok(Self::with_transport(transport, credentials))
    }
}

impl<T: Transport> Device<T> {
    pub fn with_transport(transport: T, credentials: Option<Credentials>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&self, body: &str) -> Result<Envelope> {
        let request =
            SoapRequest::new(body, DEVICE_NAMESPACES).with_credentials(self.credentials.clone());
        Ok(self.transport.send(request).await?)
    }

    /// Manufacturer, model and firmware of the device
    pub async fn get_information(&self) -> Result<DeviceInformation> {
        let response = self.call("<tds:GetDeviceInformation/>").await?;
        let info = response.value_for_path("Envelope.Body.GetDeviceInformationResponse")?;
        Ok(DeviceInformation::from_value(info))
    }

    pub async fn get_system_date_and_time(&self) -> Result<SystemDateAndTime> {
        let response = self.call("<tds:GetSystemDateAndTime/>").await?;
        let date_and_time = response
            .value_for_path("Envelope.Body.GetSystemDateAndTimeResponse.SystemDateAndTime")?;
        Ok(SystemDateAndTime::from_value(date_and_time))
    }

    /// Network, events and streaming capabilities.
    ///
    /// Fails if any of these sections is missing in the reply.
    pub async fn get_capabilities(&self) -> Result<DeviceCapabilities> {
        let response = self
            .call("<tds:GetCapabilities><tds:Category>All</tds:Category></tds:GetCapabilities>")
            .await?;
        let network = response.value_for_path(&format!("{CAPABILITIES_PATH}.Device.Network"))?;
        let events = response.value_for_path(&format!("{CAPABILITIES_PATH}.Events"))?;
        let streaming =
            response.value_for_path(&format!("{CAPABILITIES_PATH}.Media.StreamingCapabilities"))?;

        Ok(DeviceCapabilities {
            network: NetworkCapabilities::from_value(network),
            events: event_capabilities(events),
            streaming: streaming_capabilities(streaming),
        })
    }

    /// Discovery mode of the device, empty if the device did not report it
    pub async fn get_discovery_mode(&self) -> Result<String> {
        let response = self.call("<tds:GetDiscoveryMode/>").await?;
        Ok(response.value_for_path_string("Envelope.Body.GetDiscoveryModeResponse.DiscoveryMode"))
    }

    pub async fn get_scopes(&self) -> Result<Vec<String>> {
        let response = self.call("<tds:GetScopes/>").await?;
        let scopes = response.values_for_path("Envelope.Body.GetScopesResponse.Scopes")?;
        Ok(scopes
            .into_iter()
            .filter(|scope| scope.as_mapping().is_some())
            .map(|scope| as_string(scope.get("ScopeItem")))
            .collect())
    }

    pub async fn get_hostname(&self) -> Result<HostnameInformation> {
        let response = self.call("<tds:GetHostname/>").await?;
        let hostname =
            response.value_for_path("Envelope.Body.GetHostnameResponse.HostnameInformation")?;
        Ok(HostnameInformation::from_value(hostname))
    }

    pub async fn get_dns(&self) -> Result<DnsInformation> {
        let response = self.call("<tds:GetDNS/>").await?;
        let dns = response.value_for_path("Envelope.Body.GetDNSResponse.DNSInformation")?;
        Ok(DnsInformation::from_value(dns))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Mutex};

    use reqwest::StatusCode;

    use super::{
        event_capabilities, search_domains, streaming_capabilities, Device, DeviceInformation,
        DnsInformation, HostnameInformation, IpAddress, NetworkCapabilities, SystemDateAndTime,
    };
    use crate::{
        envelope::Envelope,
        error::{Error, TransportError},
        soap::{Credentials, SoapRequest},
        transport::Transport,
        value::{FromValue, Value},
    };

    /// Replies to every request with the same envelope and remembers what was sent
    #[derive(Debug, Default)]
    struct CannedTransport {
        reply: Option<Envelope>,
        requests: Mutex<Vec<SoapRequest>>,
    }

    impl CannedTransport {
        fn xml(raw: &str) -> Self {
            Self {
                reply: Some(Envelope::from_xml(raw).unwrap()),
                requests: Mutex::default(),
            }
        }

        fn value(value: Value) -> Self {
            Self {
                reply: Some(value.into()),
                requests: Mutex::default(),
            }
        }

        fn last_request(&self) -> SoapRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for CannedTransport {
        async fn send(&self, request: SoapRequest) -> Result<Envelope, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.reply
                .clone()
                .ok_or(TransportError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    fn soap_reply(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope" xmlns:tds="http://www.onvif.org/ver10/device/wsdl" xmlns:tt="http://www.onvif.org/ver10/schema">
<SOAP-ENV:Body>{body}</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
        )
    }

    fn canned_device(raw_body: &str) -> Device<CannedTransport> {
        let transport = CannedTransport::xml(&soap_reply(raw_body));
        Device::with_transport(transport, Some(Credentials::new("admin", "secret")))
    }

    #[tokio::test]
    async fn partial_device_information() {
        let doc = Value::from([(
            "Envelope",
            Value::from([(
                "Body",
                Value::from([(
                    "GetDeviceInformationResponse",
                    Value::from([("Manufacturer", "Acme".into()), ("Model", "X1".into())]),
                )]),
            )]),
        )]);
        let device = Device::with_transport(CannedTransport::value(doc), None);
        let info = device.get_information().await.unwrap();
        assert_eq!(
            info,
            DeviceInformation {
                manufacturer: "Acme".into(),
                model: "X1".into(),
                ..Default::default()
            }
        );
        let request = device.transport().last_request();
        assert_eq!(request.body, "<tds:GetDeviceInformation/>");
        assert!(request.credentials.is_none());
    }

    #[tokio::test]
    async fn full_device_information() {
        let device = canned_device(
            r#"<tds:GetDeviceInformationResponse>
<tds:Manufacturer>Acme</tds:Manufacturer>
<tds:Model>X1</tds:Model>
<tds:FirmwareVersion>V5.5.3</tds:FirmwareVersion>
<tds:SerialNumber>DS-2CD2</tds:SerialNumber>
<tds:HardwareId>88</tds:HardwareId>
</tds:GetDeviceInformationResponse>"#,
        );
        let info = device.get_information().await.unwrap();
        assert_eq!(info.firmware_version, "V5.5.3");
        assert_eq!(info.serial_number, "DS-2CD2");
        assert_eq!(info.hardware_id, "88");
        assert_eq!(
            device.transport().last_request().credentials,
            Some(Credentials::new("admin", "secret"))
        );
    }

    #[tokio::test]
    async fn missing_response_container_is_error() {
        let device = canned_device("<tds:GetHostnameResponse/>");
        let err = device.get_information().await.unwrap_err();
        assert!(matches!(err, Error::PathNotFound(ref e) if e.segment == "GetDeviceInformationResponse"));
        assert!(device.get_dns().await.is_err());
        assert!(device.get_scopes().await.is_err());
        assert!(device.get_capabilities().await.is_err());
    }

    #[tokio::test]
    async fn transport_error_is_propagated() {
        let device = Device::with_transport(CannedTransport::default(), None);
        let err = device.get_discovery_mode().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn system_date_and_time() {
        let device = canned_device(
            r#"<tds:GetSystemDateAndTimeResponse>
<tds:SystemDateAndTime>
<tt:DateTimeType>NTP</tt:DateTimeType>
<tt:DaylightSavings>True</tt:DaylightSavings>
<tt:TimeZone><tt:TZ>CST-8</tt:TZ></tt:TimeZone>
<tt:UTCDateTime>
<tt:Time><tt:Hour>4</tt:Hour><tt:Minute>5</tt:Minute><tt:Second>6</tt:Second></tt:Time>
<tt:Date><tt:Year>2024</tt:Year><tt:Month>2</tt:Month><tt:Day>29</tt:Day></tt:Date>
</tt:UTCDateTime>
<tt:LocalDateTime>
<tt:Time><tt:Hour>12</tt:Hour><tt:Minute>5</tt:Minute><tt:Second>oops</tt:Second></tt:Time>
</tt:LocalDateTime>
</tds:SystemDateAndTime>
</tds:GetSystemDateAndTimeResponse>"#,
        );
        let date_time = device.get_system_date_and_time().await.unwrap();
        assert_eq!(date_time.date_time_type, "NTP");
        assert!(date_time.daylight_savings);
        assert_eq!(date_time.time_zone.tz, "CST-8");
        assert_eq!(date_time.utc_date_time.date.day, 29);
        assert_eq!(date_time.utc_date_time.time.second, 6);
        let utc = date_time.utc().unwrap();
        assert_eq!(utc.unix_timestamp(), 1709179506);

        // time is kept even though date is missing, malformed number is zero
        assert_eq!(date_time.local_date_time.time.hour, 12);
        assert_eq!(date_time.local_date_time.time.second, 0);
        assert_eq!(date_time.local_date_time.date.year, 0);
        assert!(date_time.local_date_time.to_primitive().is_none());
    }

    #[tokio::test]
    async fn capabilities() {
        let device = canned_device(
            r#"<tds:GetCapabilitiesResponse><tds:Capabilities>
<tt:Device>
<tt:XAddr>http://192.168.1.64/onvif/device_service</tt:XAddr>
<tt:Network>
<tt:IPFilter>false</tt:IPFilter>
<tt:ZeroConfiguration>true</tt:ZeroConfiguration>
<tt:IPVersion6>TRUE</tt:IPVersion6>
<tt:DynDNS>false</tt:DynDNS>
</tt:Network>
</tt:Device>
<tt:Events>
<tt:XAddr>http://192.168.1.64/onvif/Events</tt:XAddr>
<tt:WSSubscriptionPolicySupport>true</tt:WSSubscriptionPolicySupport>
<tt:WSPullPointSupport>true</tt:WSPullPointSupport>
<tt:WSPausableSubscriptionManagerInterfaceSupport>false</tt:WSPausableSubscriptionManagerInterfaceSupport>
</tt:Events>
<tt:Media>
<tt:XAddr>http://192.168.1.64/onvif/Media</tt:XAddr>
<tt:StreamingCapabilities>
<tt:RTPMulticast>true</tt:RTPMulticast>
<tt:RTP_TCP>true</tt:RTP_TCP>
<tt:RTP_RTSP_TCP>false</tt:RTP_RTSP_TCP>
</tt:StreamingCapabilities>
</tt:Media>
</tds:Capabilities></tds:GetCapabilitiesResponse>"#,
        );
        let capabilities = device.get_capabilities().await.unwrap();
        assert!(!capabilities.network.ip_filter);
        assert!(capabilities.network.zero_config);
        assert!(capabilities.network.ip_version6);
        assert_eq!(
            capabilities.events,
            BTreeMap::from([
                ("SubscriptionPolicySupport".to_string(), true),
                ("PullPointSupport".to_string(), true),
                (
                    "PausableSubscriptionManagerInterfaceSupport".to_string(),
                    false
                ),
            ])
        );
        assert_eq!(
            capabilities.streaming,
            BTreeMap::from([
                ("RTPMulticast".to_string(), true),
                ("RTP TCP".to_string(), true),
                ("RTP RTSP TCP".to_string(), false),
            ])
        );
        assert!(device
            .transport()
            .last_request()
            .body
            .contains("<tds:Category>All</tds:Category>"));
    }

    #[tokio::test]
    async fn capabilities_without_media_fail() {
        let device = canned_device(
            r#"<tds:GetCapabilitiesResponse><tds:Capabilities>
<tt:Device><tt:Network><tt:IPFilter>true</tt:IPFilter></tt:Network></tt:Device>
<tt:Events><tt:XAddr>http://192.168.1.64/onvif/Events</tt:XAddr></tt:Events>
</tds:Capabilities></tds:GetCapabilitiesResponse>"#,
        );
        let err = device.get_capabilities().await.unwrap_err();
        assert!(matches!(err, Error::PathNotFound(ref e) if e.segment == "Media"));
    }

    #[tokio::test]
    async fn capabilities_without_network_or_events_fail() {
        let device = canned_device(
            r#"<tds:GetCapabilitiesResponse><tds:Capabilities>
<tt:Device><tt:XAddr>http://192.168.1.64/onvif/device_service</tt:XAddr></tt:Device>
<tt:Events><tt:WSPullPointSupport>true</tt:WSPullPointSupport></tt:Events>
<tt:Media><tt:StreamingCapabilities><tt:RTP_TCP>true</tt:RTP_TCP></tt:StreamingCapabilities></tt:Media>
</tds:Capabilities></tds:GetCapabilitiesResponse>"#,
        );
        let err = device.get_capabilities().await.unwrap_err();
        assert!(matches!(err, Error::PathNotFound(ref e) if e.segment == "Network"));

        let device = canned_device(
            r#"<tds:GetCapabilitiesResponse><tds:Capabilities>
<tt:Device><tt:Network><tt:IPFilter>true</tt:IPFilter></tt:Network></tt:Device>
<tt:Media><tt:StreamingCapabilities><tt:RTP_TCP>true</tt:RTP_TCP></tt:StreamingCapabilities></tt:Media>
</tds:Capabilities></tds:GetCapabilitiesResponse>"#,
        );
        let err = device.get_capabilities().await.unwrap_err();
        assert!(matches!(err, Error::PathNotFound(ref e) if e.segment == "Events"));
    }

    #[test]
    fn normalize_capability_keys() {
        let events = Value::from([
            ("WSPullPoint", "true".into()),
            ("XAddr", "http://10.0.0.2/onvif/events".into()),
        ]);
        assert_eq!(
            event_capabilities(&events),
            BTreeMap::from([("PullPoint".to_string(), true)])
        );
        let lowercase = Value::from([("xaddr", "http://x".into()), ("XADDR", "http://y".into())]);
        assert!(event_capabilities(&lowercase).is_empty());

        let streaming = Value::from([("RTP_Multicast", "false".into())]);
        assert_eq!(
            streaming_capabilities(&streaming),
            BTreeMap::from([("RTP Multicast".to_string(), false)])
        );
        assert!(streaming_capabilities(&Value::from("true")).is_empty());
    }

    #[tokio::test]
    async fn discovery_mode() {
        let device = canned_device(
            "<tds:GetDiscoveryModeResponse><tds:DiscoveryMode>Discoverable</tds:DiscoveryMode></tds:GetDiscoveryModeResponse>",
        );
        assert_eq!(device.get_discovery_mode().await.unwrap(), "Discoverable");

        let device = canned_device("<tds:GetDiscoveryModeResponse/>");
        assert_eq!(device.get_discovery_mode().await.unwrap(), "");
    }

    #[tokio::test]
    async fn scopes() {
        let device = canned_device(
            r#"<tds:GetScopesResponse>
<tds:Scopes><tt:ScopeDef>Fixed</tt:ScopeDef><tt:ScopeItem>onvif://www.onvif.org/type/video_encoder</tt:ScopeItem></tds:Scopes>
<tds:Scopes><tt:ScopeDef>Fixed</tt:ScopeDef><tt:ScopeItem>onvif://www.onvif.org/hardware/X1</tt:ScopeItem></tds:Scopes>
<tds:Scopes><tt:ScopeDef>Configurable</tt:ScopeDef><tt:ScopeItem>onvif://www.onvif.org/name/front</tt:ScopeItem></tds:Scopes>
</tds:GetScopesResponse>"#,
        );
        assert_eq!(
            device.get_scopes().await.unwrap(),
            vec![
                "onvif://www.onvif.org/type/video_encoder",
                "onvif://www.onvif.org/hardware/X1",
                "onvif://www.onvif.org/name/front",
            ]
        );

        let single = canned_device(
            "<tds:GetScopesResponse><tds:Scopes><tt:ScopeItem>onvif://www.onvif.org/name/front</tt:ScopeItem></tds:Scopes></tds:GetScopesResponse>",
        );
        assert_eq!(
            single.get_scopes().await.unwrap(),
            vec!["onvif://www.onvif.org/name/front"]
        );
    }

    #[tokio::test]
    async fn hostname() {
        let device = canned_device(
            "<tds:GetHostnameResponse><tds:HostnameInformation><tt:FromDHCP>false</tt:FromDHCP><tt:Name>front-door</tt:Name></tds:HostnameInformation></tds:GetHostnameResponse>",
        );
        let hostname = device.get_hostname().await.unwrap();
        assert_eq!(hostname.name, "front-door");
        assert!(!hostname.from_dhcp);
        assert_eq!(device.transport().last_request().body, "<tds:GetHostname/>");
    }

    #[tokio::test]
    async fn dns() {
        let device = canned_device(
            r#"<tds:GetDNSResponse><tds:DNSInformation>
<tt:FromDHCP>true</tt:FromDHCP>
<tt:SearchDomain>lan</tt:SearchDomain>
<tt:DNSFromDHCP><tt:Type>IPv4</tt:Type><tt:IPv4Address>192.168.1.1</tt:IPv4Address></tt:DNSFromDHCP>
<tt:DNSManual><tt:Type>IPv4</tt:Type><tt:IPv4Address>8.8.8.8</tt:IPv4Address></tt:DNSManual>
<tt:DNSManual><tt:Type>IPv6</tt:Type><tt:IPv6Address>2001:4860:4860::8888</tt:IPv6Address></tt:DNSManual>
</tds:DNSInformation></tds:GetDNSResponse>"#,
        );
        let dns = device.get_dns().await.unwrap();
        assert!(dns.from_dhcp);
        assert_eq!(dns.search_domain, vec!["lan"]);
        assert_eq!(
            dns.dns_from_dhcp,
            vec![IpAddress {
                kind: "IPv4".into(),
                ipv4_address: "192.168.1.1".into(),
                ..Default::default()
            }]
        );
        assert_eq!(dns.dns_manual.len(), 2);
        assert_eq!(dns.dns_manual[1].ipv6_address, "2001:4860:4860::8888");
    }

    #[test]
    fn search_domain_shapes() {
        assert_eq!(
            search_domains(Some(&Value::from("example.com"))),
            vec!["example.com"]
        );
        let typed = Value::from(vec!["a.com".to_string(), "b.com".to_string()]);
        assert_eq!(search_domains(Some(&typed)), vec!["a.com", "b.com"]);
        let untyped = Value::from(vec![
            Value::from("a.com"),
            Value::from("b.com"),
            Value::from([("-ttl", "60".into())]),
        ]);
        assert_eq!(search_domains(Some(&untyped)), vec!["a.com", "b.com", ""]);
        assert!(search_domains(None).is_empty());
    }

    #[test]
    fn empty_document_gives_default_records() {
        let empty = Value::default();
        assert_eq!(DeviceInformation::from_value(&empty), DeviceInformation::default());
        assert_eq!(DnsInformation::from_value(&empty), DnsInformation::default());
        assert_eq!(
            DnsInformation::from_value(&Value::from("not a mapping")),
            DnsInformation::default()
        );
        assert_eq!(
            SystemDateAndTime::from_value(&empty),
            SystemDateAndTime::default()
        );
        assert_eq!(
            HostnameInformation::from_value(&empty),
            HostnameInformation::default()
        );
        assert_eq!(
            NetworkCapabilities::from_value(&empty),
            NetworkCapabilities::default()
        );
        assert!(event_capabilities(&empty).is_empty());
        assert!(streaming_capabilities(&empty).is_empty());

        let date_time = SystemDateAndTime::from_value(&empty);
        assert_eq!(date_time.utc_date_time.date.year, 0);
        assert!(date_time.utc().is_none());
    }

    /// Talks to a real camera described by `ONVIF_XADDR`, `ONVIF_USER` and `ONVIF_PASSWORD`
    #[tokio::test]
    #[ignore]
    async fn live_device() {
        let _ = dotenvy::dotenv();
        let xaddr = std::env::var("ONVIF_XADDR").expect("ONVIF_XADDR to be set");
        let credentials = std::env::var("ONVIF_USER")
            .ok()
            .map(|user| Credentials::new(user, std::env::var("ONVIF_PASSWORD").unwrap_or_default()));
        let device = Device::new(xaddr, credentials).unwrap();
        let info = device.get_information().await.unwrap();
        assert!(!info.manufacturer.is_empty());
        device.get_system_date_and_time().await.unwrap();
        device.get_capabilities().await.unwrap();
        device.get_scopes().await.unwrap();
        device.get_hostname().await.unwrap();
        device.get_dns().await.unwrap();
    }
}
