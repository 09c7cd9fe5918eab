//! Marketplace value types consumed by the contract core
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

#[derive(
    minicbor::Encode,
    minicbor::Decode,
    serde::Serialize,
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub enum Incoterm {
    #[default]
    #[n(0)]
    #[serde(rename = "Ex-Works")]
    EXW,
    #[n(1)]
    #[serde(rename = "Free on Board")]
    FOB,
    #[n(2)]
    #[serde(rename = "Cost, Insurance, and Freight")]
    CIF,
}

impl Incoterm {
    /// The three letter trade code.
    pub fn code(&self) -> &'static str {
        match self {
            Incoterm::EXW => "EXW",
            Incoterm::FOB => "FOB",
            Incoterm::CIF => "CIF",
        }
    }
    /// The descriptive name, this is what lands in prose and parameters.
    pub fn name(&self) -> &'static str {
        match self {
            Incoterm::EXW => "Ex-Works",
            Incoterm::FOB => "Free on Board",
            Incoterm::CIF => "Cost, Insurance, and Freight",
        }
    }
}

impl fmt::Display for Incoterm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(
    minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, Copy, Default, Eq, PartialEq,
)]
pub enum UserTier {
    #[default]
    #[n(0)]
    #[serde(rename = "TIER_0")]
    Tier0,
    #[n(1)]
    #[serde(rename = "TIER_1")]
    Tier1,
    #[n(2)]
    #[serde(rename = "TIER_2")]
    Tier2,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self::from)
    }
    /// Calendar date as `YYYY-MM-DD`, the form stamped into contract prose.
    pub fn date_stamp(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

impl serde::Serialize for TimeStamp<Utc> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

/// Snapshot of a registered marketplace user.
#[derive(minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, PartialEq)]
pub struct User {
    #[n(0)]
    pub id: String, // bech32m, prefix `user_`
    #[n(1)]
    pub phone_number: String,
    #[n(2)]
    pub is_active: bool,
    #[n(3)]
    pub tier: UserTier,
}

/// What a seller submits to put a commodity on the market.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub commodity_name: String,
    pub quantity_kg: f64,
    pub price_per_kg_usd: f64,
    pub location_lga: String,
    pub location_state: String,
    pub incoterm: Incoterm,
    pub notes: Option<String>,
}

impl NewListing {
    pub fn new(commodity_name: &str, quantity_kg: f64, price_per_kg_usd: f64) -> Self {
        Self {
            commodity_name: commodity_name.to_string(),
            quantity_kg,
            price_per_kg_usd,
            location_lga: String::new(),
            location_state: String::new(),
            incoterm: Incoterm::default(),
            notes: None,
        }
    }
    pub fn set_location(mut self, lga: &str, state: &str) -> Self {
        self.location_lga = lga.to_string();
        self.location_state = state.to_string();
        self
    }
    pub fn set_incoterm(mut self, incoterm: Incoterm) -> Self {
        self.incoterm = incoterm;
        self
    }
    pub fn set_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Snapshot of a commodity listing as stored by the directory.
#[derive(minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Listing {
    #[n(0)]
    pub id: String, // bech32m, prefix `listing_`
    #[n(1)]
    pub seller_id: String,
    #[n(2)]
    pub commodity_name: String,
    #[n(3)]
    pub quantity_kg: f64,
    #[n(4)]
    pub price_per_kg_usd: f64,
    #[n(5)]
    pub location_lga: String,
    #[n(6)]
    pub location_state: String,
    #[n(7)]
    pub incoterm: Incoterm,
    #[n(8)]
    pub notes: Option<String>,
    #[n(9)]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn date_stamp_is_iso_date() {
        let ts = TimeStamp::new_with(2025, 3, 7, 23, 59, 59).unwrap();
        assert_eq!(ts.date_stamp(), "2025-03-07");
    }

    #[test]
    fn incoterm_serialises_to_descriptive_name() {
        let value = serde_json::to_value(Incoterm::CIF).unwrap();
        assert_eq!(value, serde_json::json!("Cost, Insurance, and Freight"));
        assert_eq!(Incoterm::CIF.code(), "CIF");
    }
}
