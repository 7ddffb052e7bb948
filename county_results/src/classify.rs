// Competitiveness ratings.
//
// A rating is a pure function of the signed two-party margin, expressed in
// percentage points (positive when the Democratic candidate leads). The same
// function is used when aggregating and when validating a persisted store.

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Category {
    Tossup,
    Tilt,
    Lean,
    Likely,
    Safe,
    Stronghold,
    Dominant,
    Annihilation,
}

impl Category {
    /// The categories that carry a party side, from the narrowest margin to the widest.
    pub const SIDED: [Category; 7] = [
        Category::Tilt,
        Category::Lean,
        Category::Likely,
        Category::Safe,
        Category::Stronghold,
        Category::Dominant,
        Category::Annihilation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Tossup => "Tossup",
            Category::Tilt => "Tilt",
            Category::Lean => "Lean",
            Category::Likely => "Likely",
            Category::Safe => "Safe",
            Category::Stronghold => "Stronghold",
            Category::Dominant => "Dominant",
            Category::Annihilation => "Annihilation",
        }
    }

    fn upper_name(&self) -> &'static str {
        match self {
            Category::Tossup => "TOSSUP",
            Category::Tilt => "TILT",
            Category::Lean => "LEAN",
            Category::Likely => "LIKELY",
            Category::Safe => "SAFE",
            Category::Stronghold => "STRONGHOLD",
            Category::Dominant => "DOMINANT",
            Category::Annihilation => "ANNIHILATION",
        }
    }

    /// Human readable range of absolute margins, without the party prefix.
    fn range_label(&self) -> &'static str {
        match self {
            Category::Tossup => "<0.5%",
            Category::Tilt => "0.50-0.99%",
            Category::Lean => "1.00-5.49%",
            Category::Likely => "5.50-9.99%",
            Category::Safe => "10.00-19.99%",
            Category::Stronghold => "20.00-29.99%",
            Category::Dominant => "30.00-39.99%",
            Category::Annihilation => "40%+",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum PartySide {
    Democratic,
    Republican,
    Tossup,
}

impl PartySide {
    pub fn name(&self) -> &'static str {
        match self {
            PartySide::Democratic => "Democratic",
            PartySide::Republican => "Republican",
            PartySide::Tossup => "Tossup",
        }
    }

    fn prefix(&self) -> Option<&'static str> {
        match self {
            PartySide::Democratic => Some("D"),
            PartySide::Republican => Some("R"),
            PartySide::Tossup => None,
        }
    }
}

/// Exclusive upper bounds of the absolute margin for each band.
/// A margin equal to a bound belongs to the next, wider band.
const BANDS: [(f64, Category); 7] = [
    (0.5, Category::Tossup),
    (1.0, Category::Tilt),
    (5.5, Category::Lean),
    (10.0, Category::Likely),
    (20.0, Category::Safe),
    (30.0, Category::Stronghold),
    (40.0, Category::Dominant),
];

pub const TOSSUP_COLOR: &str = "#f7f7f7";

const DEMOCRATIC_COLORS: [(Category, &str); 7] = [
    (Category::Tilt, "#e1f5fe"),
    (Category::Lean, "#c6dbef"),
    (Category::Likely, "#9ecae1"),
    (Category::Safe, "#6baed6"),
    (Category::Stronghold, "#3182bd"),
    (Category::Dominant, "#08519c"),
    (Category::Annihilation, "#08306b"),
];

const REPUBLICAN_COLORS: [(Category, &str); 7] = [
    (Category::Tilt, "#fee8c8"),
    (Category::Lean, "#fcae91"),
    (Category::Likely, "#fb6a4a"),
    (Category::Safe, "#ef3b2c"),
    (Category::Stronghold, "#cb181d"),
    (Category::Dominant, "#a50f15"),
    (Category::Annihilation, "#67000d"),
];

/// A competitiveness rating.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Competitiveness {
    pub category: Category,
    pub party: PartySide,
    pub code: String,
    pub color: &'static str,
}

/// One line of the published rating scale.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScaleEntry {
    pub party: PartySide,
    pub category: Category,
    pub range: String,
    pub color: &'static str,
}

/// The palette color for a cell of the scale.
///
/// Tossup has a single color, whatever the side. A sided category paired with
/// the Tossup side has no color.
pub fn color_of(party: PartySide, category: Category) -> Option<&'static str> {
    if category == Category::Tossup {
        return Some(TOSSUP_COLOR);
    }
    let table = match party {
        PartySide::Democratic => &DEMOCRATIC_COLORS,
        PartySide::Republican => &REPUBLICAN_COLORS,
        PartySide::Tossup => return None,
    };
    table.iter().find(|(c, _)| *c == category).map(|(_, col)| *col)
}

fn category_of(abs_margin: f64) -> Category {
    BANDS
        .iter()
        .find(|(upper, _)| abs_margin < *upper)
        .map(|(_, c)| *c)
        .unwrap_or(Category::Annihilation)
}

/// Rates a signed two-party margin, in percentage points.
///
/// NaN is rated as a zero margin.
pub fn classify(signed_margin_pct: f64) -> Competitiveness {
    let margin = if signed_margin_pct.is_nan() {
        0.0
    } else {
        signed_margin_pct
    };
    let category = category_of(margin.abs());
    if category == Category::Tossup {
        return Competitiveness {
            category,
            party: PartySide::Tossup,
            code: "TOSSUP".to_string(),
            color: TOSSUP_COLOR,
        };
    }
    let party = if margin > 0.0 {
        PartySide::Democratic
    } else {
        PartySide::Republican
    };
    // Both sides have a color for every sided category.
    let color = color_of(party, category).unwrap_or(TOSSUP_COLOR);
    Competitiveness {
        category,
        party,
        code: format!("{}_{}", party.prefix().unwrap_or("R"), category.upper_name()),
        color,
    }
}

/// The signed two-party margin, in percentage points. Zero when neither major
/// party received any vote.
pub fn signed_two_party_margin(dem_votes: u64, rep_votes: u64) -> f64 {
    let two_party_total = dem_votes as f64 + rep_votes as f64;
    if two_party_total == 0.0 {
        return 0.0;
    }
    (dem_votes as f64 - rep_votes as f64) / two_party_total * 100.0
}

/// Rates a locality directly from its major party votes.
pub fn classify_votes(dem_votes: u64, rep_votes: u64) -> Competitiveness {
    classify(signed_two_party_margin(dem_votes, rep_votes))
}

/// The full scale, in display order: Republican from the widest margin to the
/// narrowest, then Tossup, then Democratic from the narrowest to the widest.
pub fn competitiveness_scale() -> Vec<ScaleEntry> {
    let sided = |party: PartySide, category: Category| {
        let prefix = party.prefix().unwrap_or_default();
        ScaleEntry {
            party,
            category,
            range: format!("{}+{}", prefix, category.range_label()),
            color: color_of(party, category).unwrap_or(TOSSUP_COLOR),
        }
    };
    let mut res: Vec<ScaleEntry> = Category::SIDED
        .iter()
        .rev()
        .map(|c| sided(PartySide::Republican, *c))
        .collect();
    res.push(ScaleEntry {
        party: PartySide::Tossup,
        category: Category::Tossup,
        range: Category::Tossup.range_label().to_string(),
        color: TOSSUP_COLOR,
    });
    res.extend(
        Category::SIDED
            .iter()
            .map(|c| sided(PartySide::Democratic, *c)),
    );
    res
}
