use serde::{Deserialize, Serialize};

/// Default for optional text fields that are absent from the sheet.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Canonical fields
// ---------------------------------------------------------------------------

/// The fixed set of columns downstream consumers rely on.
///
/// Variant order is the declaration order used by mapping: a header that
/// matches two fields goes to the one declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    DeliveryDate,
    Volume,
    Salesman,
    TripId,
    TruckId,
    Area,
    Plant,
    EndCustomer,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    Numeric,
    /// Trip / delivery-order identifier; one per delivery row.
    Identifier,
    Text,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 9] = [
        Self::DeliveryDate,
        Self::Volume,
        Self::Salesman,
        Self::TripId,
        Self::TruckId,
        Self::Area,
        Self::Plant,
        Self::EndCustomer,
        Self::Distance,
    ];

    /// Fields a sheet must provide before anything is aggregated.
    pub const DEFAULT_REQUIRED: [CanonicalField; 4] = [
        Self::DeliveryDate,
        Self::Volume,
        Self::Salesman,
        Self::TripId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DeliveryDate => "delivery_date",
            Self::Volume => "volume",
            Self::Salesman => "salesman",
            Self::TripId => "trip_id",
            Self::TruckId => "truck_id",
            Self::Area => "area",
            Self::Plant => "plant",
            Self::EndCustomer => "end_customer",
            Self::Distance => "distance",
        }
    }

    /// Human-readable label, shown to users when a column is missing.
    pub fn label(self) -> &'static str {
        match self {
            Self::DeliveryDate => "Delivery Date",
            Self::Volume => "Volume",
            Self::Salesman => "Salesman",
            Self::TripId => "Trip / DP No",
            Self::TruckId => "Truck No",
            Self::Area => "Area",
            Self::Plant => "Plant",
            Self::EndCustomer => "End Customer",
            Self::Distance => "Distance",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::DeliveryDate => FieldKind::Date,
            Self::Volume | Self::Distance => FieldKind::Numeric,
            Self::TripId => FieldKind::Identifier,
            Self::Salesman | Self::TruckId | Self::Area | Self::Plant | Self::EndCustomer => {
                FieldKind::Text
            }
        }
    }

    /// Position in declaration order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FieldKind {
    /// Numeric default for absent optional numeric fields.
    pub const NUMERIC_DEFAULT: f64 = 1.0;

    pub fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Numeric => "numeric",
            Self::Identifier => "identifier",
            Self::Text => "text",
        }
    }

    /// Text rendering of the default a column of this kind is filled with.
    /// Dates have no default.
    pub fn default_text(self) -> Option<&'static str> {
        match self {
            Self::Date => None,
            Self::Numeric | Self::Identifier => Some("1"),
            Self::Text => Some(UNKNOWN),
        }
    }
}
