use serde::Serialize;
use std::str::FromStr;

use crate::Error;

/// The type of the values of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
}

impl Default for DataType {
    fn default() -> DataType {
        DataType::String
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<DataType, Error> {
        match s.to_lowercase().as_str() {
            "string" => Ok(DataType::String),
            "number" => Ok(DataType::Number),
            _ => Err(Error::InvalidDataType(s.to_string())),
        }
    }
}

/// A named column of the resolved table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Property {
    pub fn new<S: Into<String>>(name: S, data_type: DataType) -> Property {
        Property {
            name: name.into(),
            data_type,
        }
    }

    pub fn string<S: Into<String>>(name: S) -> Property {
        Property::new(name, DataType::String)
    }

    pub fn number<S: Into<String>>(name: S) -> Property {
        Property::new(name, DataType::Number)
    }
}

/// Parses specs of the form `name:type`. A spec without `:type` is a string
/// property.
impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Property, Error> {
        match s.rfind(':') {
            Some(pos) => Ok(Property::new(&s[..pos], s[pos + 1..].parse()?)),
            None => Ok(Property::string(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataType, Property};
    use crate::Error;

    #[test]
    fn test_parse_property() {
        assert_eq!("price:number".parse::<Property>().unwrap(), Property::number("price"));
        assert_eq!("name:String".parse::<Property>().unwrap(), Property::string("name"));
        assert_eq!("a:b:number".parse::<Property>().unwrap(), Property::number("a:b"));
        assert_eq!("plain".parse::<Property>().unwrap(), Property::string("plain"));
    }

    #[test]
    fn test_parse_invalid_type() {
        match "price:date".parse::<Property>() {
            Err(Error::InvalidDataType(t)) => assert_eq!(t, "date"),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!("NUMBER".parse::<DataType>().unwrap(), DataType::Number);
    }
}
