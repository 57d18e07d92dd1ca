use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::Plant;
use crate::validation::{ConsultationForm, ValidationError};

/// Local confirmation of a consultation request. Nothing leaves the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub plant_id: u32,
    pub plant_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn confirmation(&self) -> String {
        format!(
            "Consultation booked for {} (#{}) on {}! Our plant expert will contact {} at {} or {} shortly.",
            self.plant_name,
            self.plant_id,
            self.booked_at.format("%B %-d, %Y"),
            self.name,
            self.email,
            self.phone
        )
    }
}

pub fn book(plant: &Plant, form: &ConsultationForm) -> Result<Booking, ValidationError> {
    let form = form.validate()?;
    info!(plant_id = plant.id, "consultation booked");

    Ok(Booking {
        plant_id: plant.id,
        plant_name: plant.name.clone(),
        name: form.name,
        email: form.email,
        phone: form.phone,
        booked_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn form(phone: &str) -> ConsultationForm {
        ConsultationForm {
            name: " Ana ".into(),
            email: "ana@leaf.io".into(),
            phone: phone.into(),
        }
    }

    #[test]
    fn books_with_cleaned_values() {
        let catalog = Catalog::bundled().unwrap();
        let plant = catalog.plant("2").unwrap();

        let booking = book(plant, &form("555-123-4567")).unwrap();
        assert_eq!(booking.plant_id, 2);
        assert_eq!(booking.name, "Ana");
        assert_eq!(booking.phone, "5551234567");
        assert!(booking.confirmation().contains("Monstera Deliciosa"));
    }

    #[test]
    fn out_of_stock_plants_can_still_be_discussed() {
        let catalog = Catalog::bundled().unwrap();
        let plant = catalog.plant("4").unwrap();
        assert!(!plant.in_stock);
        assert!(book(plant, &form("5551234567")).is_ok());
    }

    #[test]
    fn invalid_phone_blocks_booking() {
        let catalog = Catalog::bundled().unwrap();
        let plant = catalog.plant("1").unwrap();
        assert_eq!(book(plant, &form("12345")), Err(ValidationError::InvalidPhone));
    }
}
