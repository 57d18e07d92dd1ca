//! Text renderings of the storefront pages.

use chrono::{DateTime, Utc};

use crate::catalog::{Catalog, CatalogQuery};
use crate::models::{Plant, Session};

const BRAND: &str = "GreenNest";

pub fn home(catalog: &Catalog) -> String {
    let mut out = format!(
        "{BRAND}\nBring nature home. Healthy plants and expert care advice, delivered.\n\n\
         Top rated plants\n"
    );
    for plant in catalog.top_rated(4) {
        out.push_str(&card(plant));
    }
    out.push_str(&format!(
        "\nBrowse all {} plants with `green-nest plants`.\n",
        catalog.plants().len()
    ));
    out
}

fn card(plant: &Plant) -> String {
    let stock = if plant.in_stock { "" } else { " (out of stock)" };
    format!(
        "  [{}] {} - ${:.2} - {:.1}/5{}\n",
        plant.id, plant.name, plant.price, plant.rating, stock
    )
}

pub fn plant_list(plants: &[&Plant], query: &CatalogQuery, categories: &[&str]) -> String {
    if plants.is_empty() {
        let mut out = String::from(
            "No plants match your filters.\nTry a different search or clear some filters.\n",
        );
        if query.category.is_some() {
            out.push_str(&format!("Available categories: {}\n", categories.join(", ")));
        }
        return out;
    }

    let mut out = format!("Showing {} plant(s)\n", plants.len());
    for plant in plants {
        out.push_str(&format!(
            "  [{}] {} ({})\n      {} | {} | {} | ${:.2} | {:.1}/5{}\n",
            plant.id,
            plant.name,
            plant.scientific_name,
            plant.category,
            plant.difficulty,
            plant.light,
            plant.price,
            plant.rating,
            if plant.in_stock { "" } else { " | out of stock" },
        ));
    }
    out
}

pub fn plant_details(plant: Option<&Plant>, id: &str) -> String {
    let Some(plant) = plant else {
        return format!(
            "Plant not found.\nWe couldn't find a plant with ID {id}. Browse the catalog with `green-nest plants`.\n"
        );
    };

    let mut out = format!(
        "{}\n{}\n\n{}\n\nPrice: ${:.2}\nRating: {:.1}/5\nCategory: {}\nDifficulty: {}\nLight: {}\nWatering: {}\nAvailability: {}\nImage: {}\n",
        plant.name,
        plant.scientific_name,
        plant.description,
        plant.price,
        plant.rating,
        plant.category,
        plant.difficulty,
        plant.light,
        plant.watering,
        if plant.in_stock { "In stock" } else { "Out of stock" },
        plant.image,
    );

    out.push_str("\nCare instructions\n");
    for step in &plant.care_instructions {
        out.push_str(&format!("  - {step}\n"));
    }
    out.push_str("\nBenefits\n");
    for benefit in &plant.benefits {
        out.push_str(&format!("  - {benefit}\n"));
    }
    out.push_str(&format!(
        "\nBook a free consultation: `green-nest book --id {} --name .. --email .. --phone ..`\n",
        plant.id
    ));
    out
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn profile(session: &Session) -> String {
    format!(
        "My Profile\n\nName: {}\nEmail: {}\nPhoto: {}\nMember since: {}\nLast login: {}\n",
        session.display_name.as_deref().unwrap_or("Not set"),
        session.email,
        session.photo_url.as_deref().unwrap_or("Not set"),
        timestamp(session.created_at),
        timestamp(session.last_login_at),
    )
}

pub fn about() -> String {
    format!(
        "About {BRAND}\n\n\
         Our Story\n\
         {BRAND} started with a simple belief: everyone deserves a little green in their life.\n\
         We source healthy plants from trusted growers and pair every order with care advice\n\
         so they keep thriving long after they arrive.\n\n\
         Why choose us\n\
         \x20 - Quality Plants: hand-picked and inspected before they ship\n\
         \x20 - Expert Guidance: free consultations with our plant specialists\n\
         \x20 - Safe Delivery: packed to arrive healthy and upright\n\
         \x20 - Customer Love: thousands of happy plant parents\n\n\
         Meet our experts\n\
         \x20 - Emma Rodriguez\n\
         \x20 - Michael Chen\n\
         \x20 - David Thompson\n"
    )
}

pub fn not_found(path: &str) -> String {
    format!(
        "404\nOops! This page seems to have wandered off...\nThe page you're looking for ({path}) doesn't exist.\n"
    )
}

pub fn loading() -> String {
    "Loading...\n".to_string()
}

pub fn login_prompt() -> String {
    "Please log in to continue: pass --email and --password (or --google-id-token).\n".to_string()
}

pub fn signup_prompt() -> String {
    "Create an account with `green-nest signup --name .. --email .. --password ..`.\n".to_string()
}

pub fn forgot_password_prompt() -> String {
    "Reset your password with `green-nest reset-password --email ..`.\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::session;

    #[test]
    fn empty_list_renders_empty_state() {
        let query = CatalogQuery {
            category: Some("Cactus".into()),
            ..Default::default()
        };
        let out = plant_list(&[], &query, &["Indoor", "Succulent"]);
        assert!(out.starts_with("No plants match your filters."));
        assert!(out.contains("Available categories: Indoor, Succulent"));
    }

    #[test]
    fn list_shows_count_and_cards() {
        let catalog = Catalog::bundled().unwrap();
        let plants = catalog.query(&CatalogQuery {
            search: Some("fern".into()),
            ..Default::default()
        });
        let out = plant_list(&plants, &CatalogQuery::default(), &[]);
        assert!(out.starts_with("Showing 1 plant(s)"));
        assert!(out.contains("Boston Fern"));
        assert!(out.contains("out of stock"));
    }

    #[test]
    fn missing_plant_renders_not_found() {
        let out = plant_details(None, "42");
        assert!(out.starts_with("Plant not found."));
        assert!(out.contains("ID 42"));
    }

    #[test]
    fn details_include_care_and_benefits() {
        let catalog = Catalog::bundled().unwrap();
        let out = plant_details(catalog.plant("1"), "1");
        assert!(out.starts_with("Snake Plant\nDracaena trifasciata"));
        assert!(out.contains("  - Let the soil dry out completely between waterings"));
        assert!(out.contains("  - Releases oxygen at night"));
        assert!(out.contains("Price: $24.99"));
    }

    #[test]
    fn profile_shows_missing_fields_as_not_set() {
        let mut session = session("u1", "ana@leaf.io");
        session.created_at = DateTime::from_timestamp_millis(1_700_000_000_000);
        let out = profile(&session);
        assert!(out.contains("Name: Not set"));
        assert!(out.contains("Member since: November 14, 2023"));
        assert!(out.contains("Last login: N/A"));
        assert!(!out.contains("id-u1"));
    }

    #[test]
    fn home_lists_top_rated() {
        let catalog = Catalog::bundled().unwrap();
        let out = home(&catalog);
        assert!(out.contains("[1] Snake Plant"));
        assert_eq!(out.matches("\n  [").count(), 4);
    }

    #[test]
    fn not_found_echoes_path() {
        assert!(not_found("/garden").contains("(/garden)"));
    }
}
