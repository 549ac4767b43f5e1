//! Fixed namespace declarations carried by every exported IDS document.

/// The IDS namespace; all IDS elements live here under the `ids` prefix.
pub const IDS_NAMESPACE: &str = "http://standards.buildingsmart.org/IDS";

/// XML Schema namespace (`xs` prefix).
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema Instance namespace (`xsi` prefix).
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Value of `xsi:schemaLocation` pointing at the IDS 1.0 schema.
pub const IDS_SCHEMA_LOCATION: &str =
    "http://standards.buildingsmart.org/IDS http://standards.buildingsmart.org/IDS/1.0/ids.xsd";

/// Prefix used for IDS elements.
pub const IDS_PREFIX: &str = "ids";

/// The four root attributes, in emission order.
pub const ROOT_ATTRIBUTES: [(&str, &str); 4] = [
    ("xmlns:ids", IDS_NAMESPACE),
    ("xmlns:xs", XS_NAMESPACE),
    ("xmlns:xsi", XSI_NAMESPACE),
    ("xsi:schemaLocation", IDS_SCHEMA_LOCATION),
];
