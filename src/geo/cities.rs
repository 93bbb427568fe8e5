//! Static city-name to coordinate lookup
//!
//! Communities registered without precise coordinates are placed at the
//! approximate centre of their city. The table is plain immutable data and is
//! handed to the locator explicitly.

use std::collections::HashMap;

use crate::models::Coordinates;

/// Approximate centres of Brazilian state capitals and large cities
const BRAZIL_CITIES: &[(&str, f64, f64)] = &[
    ("São Paulo", -23.5505, -46.6333),
    ("Rio de Janeiro", -22.9068, -43.1729),
    ("Belo Horizonte", -19.9167, -43.9345),
    ("Brasília", -15.7939, -47.8828),
    ("Salvador", -12.9714, -38.5014),
    ("Fortaleza", -3.7319, -38.5267),
    ("Recife", -8.0476, -34.8770),
    ("Porto Alegre", -30.0346, -51.2177),
    ("Curitiba", -25.4284, -49.2733),
    ("Manaus", -3.1190, -60.0217),
    ("Belém", -1.4558, -48.4902),
    ("Goiânia", -16.6869, -49.2648),
    ("Campinas", -22.9099, -47.0626),
    ("Guarulhos", -23.4538, -46.5333),
    ("Santos", -23.9608, -46.3336),
    ("São Luís", -2.5307, -44.3068),
    ("Maceió", -9.6658, -35.7353),
    ("Natal", -5.7945, -35.2110),
    ("Teresina", -5.0892, -42.8019),
    ("João Pessoa", -7.1195, -34.8450),
    ("Florianópolis", -27.5954, -48.5480),
    ("Vitória", -20.3155, -40.3128),
    ("Campo Grande", -20.4697, -54.6201),
    ("Cuiabá", -15.6014, -56.0979),
    ("Aracaju", -10.9472, -37.0731),
];

/// Immutable mapping from city names to approximate coordinates
#[derive(Debug, Clone, Default)]
pub struct CityTable {
    entries: HashMap<String, Coordinates>,
}

impl CityTable {
    /// A table with no entries; only precise coordinates will resolve
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table of Brazilian cities
    #[must_use]
    pub fn brazil() -> Self {
        BRAZIL_CITIES
            .iter()
            .map(|&(name, lat, lon)| (name, Coordinates::new(lat, lon)))
            .collect()
    }

    /// Look up a city, ignoring case, surrounding whitespace and accents
    #[must_use]
    pub fn lookup(&self, city: &str) -> Option<Coordinates> {
        self.entries.get(&normalize_city(city)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Coordinates)> for CityTable {
    fn from_iter<I: IntoIterator<Item = (S, Coordinates)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, coordinates)| (normalize_city(name.as_ref()), coordinates))
                .collect(),
        }
    }
}

fn normalize_city(city: &str) -> String {
    city.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
