use serde::{Deserialize, Serialize};

/// Assigned channel category. The downstream ETL groups the exported
/// channel index by these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NewsPolitics,
    Music,
    Entertainment,
    Education,
    Sports,
    TravelEvents,
    PeopleBlogs,
}

impl Category {
    /// Human-readable label used as the grouping key in the exported index.
    pub fn label(&self) -> &'static str {
        match self {
            Category::NewsPolitics => "News & Politics",
            Category::Music => "Music",
            Category::Entertainment => "Entertainment",
            Category::Education => "Education",
            Category::Sports => "Sports",
            Category::TravelEvents => "Travel & Events",
            Category::PeopleBlogs => "People & Blogs",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the data-driven category keyword table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: Category,
    pub terms: Vec<String>,
}

/// Scored keyword classifier over the category table. Each present term
/// counts once; the best-scoring category wins, with a fallback when
/// nothing matches.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    table: Vec<CategoryKeywords>,
}

impl CategoryClassifier {
    pub fn new(table: Vec<CategoryKeywords>) -> Self {
        Self { table }
    }

    pub fn classify(&self, title: &str, description: &str, keywords: &[String]) -> Category {
        let combined =
            format!("{} {} {}", title, description, keywords.join(" ")).to_lowercase();

        let mut best: Option<(Category, usize)> = None;
        for row in &self.table {
            let hits = row
                .terms
                .iter()
                .filter(|term| combined.contains(&term.to_lowercase()))
                .count();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, best_hits)) if hits <= best_hits => {}
                _ => best = Some((row.category, hits)),
            }
        }

        best.map(|(category, _)| category)
            .unwrap_or(Category::PeopleBlogs)
    }
}

#[cfg(test)]
impl CategoryClassifier {
    pub fn empty() -> Self {
        Self { table: Vec::new() }
    }

    pub fn test_table() -> Self {
        Self::new(vec![
            CategoryKeywords {
                category: Category::NewsPolitics,
                terms: vec!["news".into(), "politics".into(), "breaking".into()],
            },
            CategoryKeywords {
                category: Category::Music,
                terms: vec!["music".into(), "song".into(), "singer".into()],
            },
            CategoryKeywords {
                category: Category::Sports,
                terms: vec!["cricket".into(), "sports".into(), "football".into()],
            },
            CategoryKeywords {
                category: Category::TravelEvents,
                terms: vec!["travel".into(), "tour".into(), "trip".into()],
            },
        ])
    }
}
