//! Controlled vocabularies
//!
//! Some AVM fields only accept terms from a fixed list. Input is case
//! normalized first, so `"simulation"` is stored as `"Simulation"` and
//! `"icrs"` as `"ICRS"`.

/// Case normalization applied before the membership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    /// First character upper case, the rest lower case
    Capitalize,
    /// Everything upper case
    Upper,
}

impl CaseTransform {
    /// Apply the transform
    pub fn apply(self, value: &str) -> String {
        match self {
            CaseTransform::Upper => value.to_uppercase(),
            CaseTransform::Capitalize => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// A named list of allowed terms
#[derive(Debug, PartialEq, Eq)]
pub struct Vocabulary {
    /// Vocabulary name, for messages
    pub name: &'static str,
    /// Allowed terms, already in normalized case
    pub terms: &'static [&'static str],
    /// Normalization applied to input
    pub case: CaseTransform,
}

impl Vocabulary {
    /// Normalize the case of a term
    pub fn normalize(&self, value: &str) -> String {
        self.case.apply(value.trim())
    }

    /// Whether a normalized term is allowed
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term)
    }

    /// Allowed terms joined for error messages
    pub fn describe(&self) -> String {
        self.terms.join(", ")
    }
}

/// Image type
pub static TYPE: Vocabulary = Vocabulary {
    name: "Type",
    terms: &[
        "Observation",
        "Artwork",
        "Photographic",
        "Planetary",
        "Simulation",
        "Collage",
        "Chart",
    ],
    case: CaseTransform::Capitalize,
};

/// Image product quality
pub static IMAGE_PRODUCT_QUALITY: Vocabulary = Vocabulary {
    name: "Image.ProductQuality",
    terms: &["Good", "Moderate", "Poor"],
    case: CaseTransform::Capitalize,
};

/// Color assigned to each exposure
pub static SPECTRAL_COLOR_ASSIGNMENT: Vocabulary = Vocabulary {
    name: "Spectral.ColorAssignment",
    terms: &[
        "Purple",
        "Blue",
        "Cyan",
        "Green",
        "Yellow",
        "Orange",
        "Red",
        "Magenta",
        "Grayscale",
        "Pseudocolor",
        "Luminosity",
    ],
    case: CaseTransform::Capitalize,
};

/// Spectral band of each exposure
pub static SPECTRAL_BAND: Vocabulary = Vocabulary {
    name: "Spectral.Band",
    terms: &[
        "Radio",
        "Millimeter",
        "Infrared",
        "Optical",
        "Ultraviolet",
        "X-ray",
        "Gamma-ray",
    ],
    case: CaseTransform::Capitalize,
};

/// Celestial coordinate frame
pub static SPATIAL_COORDINATE_FRAME: Vocabulary = Vocabulary {
    name: "Spatial.CoordinateFrame",
    terms: &["ICRS", "FK5", "FK4", "ECL", "GAL", "SGAL"],
    case: CaseTransform::Upper,
};

/// Coordinate system projection
pub static SPATIAL_COORDSYSTEM_PROJECTION: Vocabulary = Vocabulary {
    name: "Spatial.CoordsystemProjection",
    terms: &["TAN", "SIN", "ARC", "AIT", "CAR", "CEA"],
    case: CaseTransform::Upper,
};

/// Quality of the spatial information
pub static SPATIAL_QUALITY: Vocabulary = Vocabulary {
    name: "Spatial.Quality",
    terms: &["Full", "Position"],
    case: CaseTransform::Capitalize,
};
