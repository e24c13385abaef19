//! Demo seed data: the district's congregation accounts and a small
//! member directory. Real deployments replace this with a database-backed
//! loader behind the same store types.

use uuid::Uuid;

use crate::models::{Congregation, Gender, Member};
use crate::services::credentials::SeedCredential;

pub const DEFAULT_PIN: &str = "1234";

fn congregation(name: &str, username: &str, is_district: bool) -> Congregation {
    Congregation {
        id: Uuid::new_v4(),
        name: name.to_string(),
        username: username.to_string(),
        is_district,
    }
}

fn credential(name: &str, username: &str, password: &str, is_district: bool) -> SeedCredential {
    SeedCredential {
        congregation: congregation(name, username, is_district),
        password: password.to_string(),
        pin: DEFAULT_PIN.to_string(),
    }
}

/// The district's congregation accounts. Every account starts on the
/// default PIN and is expected to rotate it.
pub fn seed_credentials() -> Vec<SeedCredential> {
    vec![
        credential(
            "Emmanuel Congregation Ahinsan",
            "emmanuel",
            "emmanuel123",
            false,
        ),
        credential(
            "Peniel Congregation Esreso No1",
            "peniel",
            "peniel123",
            false,
        ),
        credential("District Admin", "district", "district123", true),
        credential(
            "Mizpah Congregation Odagya No1",
            "mizpah_odagya1",
            "mizpah2024",
            false,
        ),
        credential(
            "Christ Congregation Ahinsan Estate",
            "christ_ahinsan",
            "christ2024",
            false,
        ),
        credential(
            "Ebenezer Congregation Dompoase Aprabo",
            "ebenezer_dompoase",
            "ebenezer2024",
            false,
        ),
        credential(
            "Favour Congregation Esreso No2",
            "favour_esreso2",
            "favour2024",
            false,
        ),
        credential(
            "Liberty Congregation Esreso High Tension",
            "liberty_esreso",
            "liberty2024",
            false,
        ),
        credential("Odagya No2", "odagya2", "odagya2024", false),
        credential("NOM", "nom_congregation", "nom2024", false),
        credential("Kokobriko", "kokobriko", "kokobriko2024", false),
    ]
}

fn member(
    congregation: &Congregation,
    first: &str,
    last: &str,
    gender: Gender,
    phone: &str,
) -> Member {
    Member {
        id: Uuid::new_v4(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        gender,
        phone_number: phone.to_string(),
        congregation_id: congregation.id,
        congregation_name: congregation.name.clone(),
    }
}

/// Demo members spread across the first two congregations.
pub fn seed_members(congregations: &[Congregation]) -> Vec<Member> {
    let mut members = Vec::new();
    let mut by_username = |username: &str| {
        congregations
            .iter()
            .find(|c| c.username == username)
            .cloned()
    };

    if let Some(emmanuel) = by_username("emmanuel") {
        members.push(member(
            &emmanuel,
            "Kwame",
            "Mensah",
            Gender::Male,
            "0244111222",
        ));
        members.push(member(
            &emmanuel,
            "Akosua",
            "Darko",
            Gender::Female,
            "0244333444",
        ));
        members.push(member(
            &emmanuel,
            "Yaw",
            "Boakye",
            Gender::Male,
            "0200555666",
        ));
    }

    if let Some(peniel) = by_username("peniel") {
        members.push(member(
            &peniel,
            "Ama",
            "Owusu",
            Gender::Female,
            "0208777888",
        ));
        members.push(member(
            &peniel,
            "Kofi",
            "Asante",
            Gender::Male,
            "0249999000",
        ));
    }

    members
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_district_account() {
        let seeds = seed_credentials();
        let districts = seeds
            .iter()
            .filter(|s| s.congregation.is_district)
            .count();
        assert_eq!(districts, 1);
    }

    #[test]
    fn usernames_are_unique() {
        let seeds = seed_credentials();
        let mut usernames: Vec<&str> = seeds
            .iter()
            .map(|s| s.congregation.username.as_str())
            .collect();
        usernames.sort_unstable();
        usernames.dedup();
        assert_eq!(usernames.len(), seeds.len());
    }

    #[test]
    fn members_carry_their_congregation_name() {
        let congregations: Vec<Congregation> = seed_credentials()
            .into_iter()
            .map(|s| s.congregation)
            .collect();
        let members = seed_members(&congregations);
        assert!(!members.is_empty());
        assert!(members
            .iter()
            .all(|m| congregations
                .iter()
                .any(|c| c.id == m.congregation_id && c.name == m.congregation_name)));
    }
}
