use std::fmt;

use serde::ser::SerializeStruct;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::data::{Description, SdpType};

/// Serializes as the browser's `RTCSessionDescriptionInit`.
///
/// ```json
/// { "type": "offer", "sdp": "v=0\r\n..." }
/// ```
impl Serialize for Description {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut o = s.serialize_struct("Description", 2)?;
        o.serialize_field("type", self.type_string())?;
        o.serialize_field("sdp", &self.to_string())?;
        o.end()
    }
}

impl<'de> Deserialize<'de> for Description {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug)]
        enum Field {
            Typ,
            Sdp,
        }

        impl<'de> Deserialize<'de> for Field {
            fn deserialize<D>(deserializer: D) -> Result<Field, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct FieldVisitor;
                impl<'de> de::Visitor<'de> for FieldVisitor {
                    type Value = Field;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str("`type` or `sdp`")
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Field, E>
                    where
                        E: de::Error,
                    {
                        match value {
                            "type" => Ok(Field::Typ),
                            "sdp" => Ok(Field::Sdp),
                            _ => Err(de::Error::unknown_field(value, FIELDS)),
                        }
                    }
                }
                deserializer.deserialize_identifier(FieldVisitor)
            }
        }

        struct StructVisitor;

        impl<'de> de::Visitor<'de> for StructVisitor {
            type Value = Description;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("Description")
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<Description, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let typ: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let sdp: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                parse(&sdp, &typ)
            }

            fn visit_map<V>(self, mut map: V) -> Result<Description, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut typ: Option<String> = None;
                let mut sdp: Option<String> = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Typ => {
                            if typ.is_some() {
                                return Err(de::Error::duplicate_field("type"));
                            }
                            typ = Some(map.next_value()?);
                        }
                        Field::Sdp => {
                            if sdp.is_some() {
                                return Err(de::Error::duplicate_field("sdp"));
                            }
                            sdp = Some(map.next_value()?);
                        }
                    }
                }
                let sdp = sdp.ok_or_else(|| de::Error::missing_field("sdp"))?;
                parse(&sdp, typ.as_deref().unwrap_or_default())
            }
        }

        const FIELDS: &[&str] = &["type", "sdp"];
        d.deserialize_struct("Description", FIELDS, StructVisitor)
    }
}

fn parse<E: de::Error>(sdp: &str, typ: &str) -> Result<Description, E> {
    Description::parse(sdp, SdpType::from(typ))
        .map_err(|e| de::Error::custom(format!("Failed to parse SDP: {}", e)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SdpConfig;

    fn offer() -> Description {
        let config = SdpConfig::new().set_session_id("123");
        Description::with_config(SdpType::Offer, &config)
    }

    #[test]
    fn serialize_deserialize_offer() {
        let offer = offer();
        let json = serde_json::to_string(&offer).unwrap();

        assert_eq!(
            json,
            "{\"type\":\"offer\",\"sdp\":\"v=0\\r\\no=- 123 0 IN IP4 127.0.0.1\\r\\ns=-\\r\\n\
            t=0 0\\r\\na=msid-semantic: WMS\\r\\na=setup:actpass\\r\\na=ice-options:trickle\\r\\n\"}"
        );

        let offer2: Description = serde_json::from_str(&json).unwrap();

        assert_eq!(offer, offer2);
    }

    #[test]
    fn deserialize_answer() {
        let json = "{\"type\":\"answer\",\"sdp\":\"v=0\\r\\no=- 9 2 IN IP4 127.0.0.1\\r\\n\
            s=-\\r\\nt=0 0\\r\\na=setup:active\\r\\n\"}";
        let answer: Description = serde_json::from_str(json).unwrap();

        assert_eq!(answer.typ(), SdpType::Answer);
        assert_eq!(answer.session_id(), "9");
        assert_eq!(answer.role_string(), "active");
    }

    #[test]
    fn deserialize_missing_sdp() {
        let r: Result<Description, _> = serde_json::from_str("{\"type\":\"offer\"}");
        assert!(r.is_err());
    }

    #[test]
    fn deserialize_bad_sdp() {
        let r: Result<Description, _> =
            serde_json::from_str("{\"type\":\"offer\",\"sdp\":\"nonsense\"}");
        assert!(r.is_err());
    }
}
