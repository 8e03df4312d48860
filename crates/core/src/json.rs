//! Serde helpers shared by the transaction and block JSON shapes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialize an empty list as `null`.
pub(crate) fn nullable<S: Serializer, T: Serialize>(
    items: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if items.is_empty() {
        serializer.serialize_none()
    } else {
        items.serialize(serializer)
    }
}

/// Accept `null` (or a missing field, with `#[serde(default)]`) as an empty list.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Byte strings as standard (padded) base64.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => STANDARD.decode(s).map_err(D::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Out<'a> {
        #[serde(serialize_with = "nullable")]
        items: &'a [u64],
        #[serde(with = "base64_bytes")]
        data: &'a [u8],
    }

    #[derive(Deserialize)]
    struct In {
        #[serde(default, deserialize_with = "null_as_empty")]
        items: Vec<u64>,
        #[serde(default, deserialize_with = "base64_bytes::deserialize")]
        data: Vec<u8>,
    }

    #[test]
    fn test_empty_list_is_null() {
        let json = serde_json::to_string(&Out {
            items: &[],
            data: b"42",
        })
        .unwrap();
        assert_eq!(json, r#"{"items":null,"data":"NDI="}"#);
        let json = serde_json::to_string(&Out {
            items: &[1, 2],
            data: &[],
        })
        .unwrap();
        assert_eq!(json, r#"{"items":[1,2],"data":""}"#);
    }

    #[test]
    fn test_null_and_missing_read_as_empty() {
        let parsed: In = serde_json::from_str(r#"{"items":null,"data":null}"#).unwrap();
        assert!(parsed.items.is_empty());
        assert!(parsed.data.is_empty());
        let parsed: In = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
        let parsed: In = serde_json::from_str(r#"{"items":[3],"data":"/w=="}"#).unwrap();
        assert_eq!(parsed.items, vec![3]);
        assert_eq!(parsed.data, vec![0xff]);
        assert!(serde_json::from_str::<In>(r#"{"data":"*"}"#).is_err());
        // hex is not accepted as a substitute
        assert!(serde_json::from_str::<In>(r#"{"data":"ff"}"#).is_err());
    }
}
