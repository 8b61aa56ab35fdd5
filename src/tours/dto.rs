use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub name: String,
    pub summary: Option<String>,
    pub price: f64,
    pub image_cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

/// URL-safe identifier derived from the tour name, used in checkout
/// redirect targets.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Sea & Sun -- 2026!"), "sea-sun-2026");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(slugify("  Snow Adventurer  "), "snow-adventurer");
    }
}
