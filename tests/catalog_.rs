#![allow(dead_code)]

use forkful::state::{Ingredient, Recipe};

pub fn recipe(id: &str, title: &str, servings: u32, ingredients: &[(Option<f64>, &str, &str)]) -> Recipe {
	Recipe {
		id: id.to_owned(),
		title: title.to_owned(),
		publisher: "Test Kitchen".to_owned(),
		source_url: format!("https://example.com/{}", id),
		image_url: format!("https://example.com/{}.jpg", id),
		servings,
		cooking_time: 45,
		ingredients: ingredients
			.iter()
			.map(|&(quantity, unit, description)| Ingredient {
				quantity,
				unit: unit.to_owned(),
				description: description.to_owned(),
			})
			.collect(),
		key: None,
	}
}

/// 20 pizzas, a soup and a pasta dish.
pub fn catalog() -> Vec<Recipe> {
	let mut recipes: Vec<_> = (1..=20).map(|i| recipe(&format!("pizza-{}", i), &format!("Pizza {}", i), 2, &[(Some(0.5), "kg", "flour")])).collect();
	recipes.push(soup());
	recipes.push(recipe("pasta", "Pasta al pomodoro", 2, &[(Some(250.0), "g", "spaghetti"), (Some(1.0), "", "garlic clove")]));
	recipes
}

/// 4 servings, with 2 kg tomatoes.
pub fn soup() -> Recipe {
	recipe("soup", "Tomato soup", 4, &[(Some(2.0), "kg", "tomatoes"), (Some(0.5), "l", "water"), (None, "", "salt")])
}

pub fn pizza_ids(range: core::ops::RangeInclusive<usize>) -> Vec<String> {
	range.map(|i| format!("pizza-{}", i)).collect()
}
