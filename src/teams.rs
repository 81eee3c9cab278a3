use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Team {
    pub name: &'static str,
    pub slug: &'static str,
}

impl Team {
    /// Lower-cased last word of the full name, used to spot the team in OCR text.
    pub fn suffix(&self) -> String {
        self.name
            .split_whitespace()
            .last()
            .unwrap_or(self.name)
            .to_lowercase()
    }
}

/// Current franchises. Order matters: OCR resolution reports matches in this order.
pub const IPL_TEAMS: &[Team] = &[
    Team {
        name: "Chennai Super Kings",
        slug: "chennai-super-kings",
    },
    Team {
        name: "Delhi Capitals",
        slug: "delhi-capitals",
    },
    Team {
        name: "Gujarat Titans",
        slug: "gujarat-titans",
    },
    Team {
        name: "Kolkata Knight Riders",
        slug: "kolkata-knight-riders",
    },
    Team {
        name: "Lucknow Super Giants",
        slug: "lucknow-super-giants",
    },
    Team {
        name: "Mumbai Indians",
        slug: "mumbai-indians",
    },
    Team {
        name: "Punjab Kings",
        slug: "punjab-kings",
    },
    Team {
        name: "Rajasthan Royals",
        slug: "rajasthan-royals",
    },
    Team {
        name: "Royal Challengers Bengaluru",
        slug: "royal-challengers-bengaluru",
    },
    Team {
        name: "Sunrisers Hyderabad",
        slug: "sunrisers-hyderabad",
    },
];

pub fn team_by_slug(slug: &str) -> Option<&'static Team> {
    let slug = slug.trim();
    IPL_TEAMS.iter().find(|t| t.slug.eq_ignore_ascii_case(slug))
}

pub fn team_by_name(name: &str) -> Option<&'static Team> {
    let name = name.trim();
    IPL_TEAMS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}
