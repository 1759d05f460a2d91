use crate::models::RecipeIngredient;

/// Result of checking a recipe's ingredients against the fridge.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub ingredients: Vec<RecipeIngredient>,
    pub available: usize,
    pub total: usize,
    pub score: u8,
}

/// Bidirectional case-insensitive substring match against any inventory name.
///
/// No stemming, plurals or synonyms: "Soy" matches "Soy Sauce", while
/// "spring onion" never matches "scallion".
pub fn is_available<S: AsRef<str>>(ingredient: &str, inventory_names: &[S]) -> bool {
    let needle = ingredient.to_lowercase();
    inventory_names.iter().any(|name| {
        let have = name.as_ref().to_lowercase();
        have.contains(&needle) || needle.contains(&have)
    })
}

/// Percentage of available ingredients, rounded; zero when there are none.
pub fn match_score(available: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((available as f64 / total as f64) * 100.0).round() as u8
}

/// Sets each ingredient's availability flag and computes the aggregate score.
pub fn annotate_ingredients<S: AsRef<str>>(
    ingredients: Vec<RecipeIngredient>,
    inventory_names: &[S],
) -> MatchSummary {
    let ingredients: Vec<RecipeIngredient> = ingredients
        .into_iter()
        .map(|mut ing| {
            ing.available = is_available(&ing.name, inventory_names);
            ing
        })
        .collect();
    let available = ingredients.iter().filter(|i| i.available).count();
    let total = ingredients.len();
    MatchSummary {
        score: match_score(available, total),
        ingredients,
        available,
        total,
    }
}

/// Score for plain name lists.
pub fn calculate_match_score<A: AsRef<str>, R: AsRef<str>>(
    available_names: &[A],
    required_names: &[R],
) -> u8 {
    let matched = required_names
        .iter()
        .filter(|r| is_available(r.as_ref(), available_names))
        .count();
    match_score(matched, required_names.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str) -> RecipeIngredient {
        RecipeIngredient {
            name: name.into(),
            quantity: 1.0,
            unit: "piece".into(),
            available: false,
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn substring_match_runs_both_ways() {
        assert!(is_available("Soy Sauce", &["Soy"]));
        assert!(is_available("Soy", &["Soy Sauce"]));
        assert!(is_available("chicken", &["Chicken Breast"]));
        assert!(is_available("CHICKEN BREAST", &["chicken"]));
    }

    #[test]
    fn availability_is_symmetric() {
        let pairs = [
            ("Garlic", "garlic cloves"),
            ("Rice", "Brown Rice"),
            ("Milk", "Eggs"),
            ("spring onion", "scallion"),
        ];
        for (a, b) in pairs {
            assert_eq!(is_available(a, &[b]), is_available(b, &[a]), "{a} / {b}");
        }
    }

    #[test]
    fn synonyms_without_substring_do_not_match() {
        assert!(!is_available("spring onion", &["scallion"]));
        assert!(!is_available("Sugar", &["Eggs", "Tomatoes"]));
    }

    #[test]
    fn empty_inventory_matches_nothing() {
        let empty: [&str; 0] = [];
        assert!(!is_available("Eggs", &empty));
    }

    #[test]
    fn score_edges() {
        assert_eq!(match_score(0, 0), 0);
        assert_eq!(match_score(5, 5), 100);
        assert_eq!(match_score(0, 4), 0);
        assert_eq!(match_score(1, 3), 33);
        assert_eq!(match_score(2, 3), 67);
        assert_eq!(match_score(1, 8), 13);
    }

    #[test]
    fn annotate_counts_and_flags() {
        let summary = annotate_ingredients(
            vec![
                ingredient("Eggs"),
                ingredient("Tomatoes"),
                ingredient("Sugar"),
                ingredient("Salt"),
                ingredient("Onion"),
            ],
            &["Eggs", "Tomatoes", "Onion", "Broccoli"],
        );
        assert_eq!(summary.available, 3);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.score, 60);
        let flags: Vec<bool> = summary.ingredients.iter().map(|i| i.available).collect();
        assert_eq!(flags, vec![true, true, false, false, true]);
    }

    #[test]
    fn annotate_overwrites_stale_flags() {
        let mut stale = ingredient("Lobster");
        stale.available = true;
        let summary = annotate_ingredients(vec![stale], &["Eggs"]);
        assert!(!summary.ingredients[0].available);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn annotate_with_no_ingredients_scores_zero() {
        let summary = annotate_ingredients(Vec::new(), &["Eggs"]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn plain_list_score() {
        let have = ["Chicken Breast", "Broccoli", "Soy Sauce"];
        assert_eq!(calculate_match_score(&have, &["chicken", "broccoli"]), 100);
        assert_eq!(calculate_match_score(&have, &["beef", "broccoli"]), 50);
        let none: [&str; 0] = [];
        assert_eq!(calculate_match_score(&have, &none), 0);
    }
}
