use crate::domain::model::{Passenger, PassengerSummary};
use crate::domain::ports::PassengerSource;
use crate::utils::error::{Result, StatsError};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Passengers reachable from `passenger_id` through contact lists, grouped
/// by the number of hops needed to reach them (1..=depth).
///
/// Every passenger is listed at most once, at the shallowest level it was
/// found. Levels with nobody new are still present, as empty lists.
pub fn contacts_by_depth<S: PassengerSource + ?Sized>(
    source: &S,
    passenger_id: &str,
    depth: u32,
) -> Result<BTreeMap<u32, Vec<PassengerSummary>>> {
    let passenger_id = passenger_id.trim();
    if passenger_id.is_empty() {
        return Err(StatsError::InvalidContactQueryError {
            message: "passenger id is empty".to_string(),
        });
    }
    if depth == 0 {
        return Err(StatsError::InvalidContactQueryError {
            message: "depth must be at least 1".to_string(),
        });
    }

    let passengers = source.passengers();
    if depth as usize > passengers.len() {
        return Err(StatsError::InvalidContactQueryError {
            message: format!(
                "depth {} exceeds the number of passengers ({})",
                depth,
                passengers.len()
            ),
        });
    }

    let by_id: HashMap<&str, &Passenger> = passengers
        .iter()
        .map(|p| (p.passenger_id(), p))
        .collect();
    let root = by_id
        .get(passenger_id)
        .copied()
        .ok_or_else(|| StatsError::UnknownPassengerError {
            id: passenger_id.to_string(),
        })?;

    let mut visited: HashSet<&str> = HashSet::from([root.passenger_id()]);
    let mut frontier = vec![root];
    let mut levels = BTreeMap::new();

    for level in 1..=depth {
        let mut next = Vec::new();
        for passenger in &frontier {
            for contact_id in passenger.contacts() {
                // 找不到的聯絡人直接略過
                let Some(contact) = by_id.get(contact_id.as_str()).copied() else {
                    continue;
                };
                if visited.insert(contact.passenger_id()) {
                    next.push(contact);
                }
            }
        }

        levels.insert(level, next.iter().map(|p| PassengerSummary::from(*p)).collect());
        frontier = next;
    }

    tracing::debug!(
        "Contact search from {} to depth {} reached {} passengers",
        passenger_id,
        depth,
        visited.len() - 1
    );
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::PassengerRegistry;
    use crate::domain::model::SymptomSeverity;

    fn passenger(id: &str, contacts: &[&str]) -> Passenger {
        Passenger::new(id, format!("Name {}", id), SymptomSeverity::NotInfected, None)
            .unwrap()
            .with_contacts(contacts.iter().copied())
    }

    /// A -> B, C ; B -> A, D ; C -> D, E ; D -> F
    fn network() -> PassengerRegistry {
        PassengerRegistry::from_passengers(vec![
            passenger("A", &["B", "C"]),
            passenger("B", &["A", "D"]),
            passenger("C", &["D", "E"]),
            passenger("D", &["F"]),
            passenger("E", &[]),
            passenger("F", &[]),
        ])
    }

    fn ids(level: &[PassengerSummary]) -> Vec<&str> {
        level.iter().map(|p| p.passenger_id.as_str()).collect()
    }

    #[test]
    fn test_contacts_by_depth() {
        let registry = network();
        let levels = contacts_by_depth(&registry, "A", 3).unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(ids(&levels[&1]), vec!["B", "C"]);
        assert_eq!(ids(&levels[&2]), vec!["D", "E"]);
        assert_eq!(ids(&levels[&3]), vec!["F"]);
    }

    #[test]
    fn test_levels_past_the_network_are_empty() {
        let registry = network();
        let levels = contacts_by_depth(&registry, " E ", 2).unwrap();
        assert!(levels[&1].is_empty());
        assert!(levels[&2].is_empty());
    }

    #[test]
    fn test_invalid_queries() {
        let registry = network();
        assert!(matches!(
            contacts_by_depth(&registry, "", 1),
            Err(StatsError::InvalidContactQueryError { .. })
        ));
        assert!(matches!(
            contacts_by_depth(&registry, "A", 0),
            Err(StatsError::InvalidContactQueryError { .. })
        ));
        assert!(matches!(
            contacts_by_depth(&registry, "A", 7),
            Err(StatsError::InvalidContactQueryError { .. })
        ));
        assert!(matches!(
            contacts_by_depth(&registry, "Z", 1),
            Err(StatsError::UnknownPassengerError { .. })
        ));
    }

    #[test]
    fn test_unknown_contact_ids_are_ignored() {
        let passengers = vec![passenger("A", &["ghost", "B"]), passenger("B", &[])];
        let levels = contacts_by_depth(&passengers, "A", 1).unwrap();
        assert_eq!(ids(&levels[&1]), vec!["B"]);
    }
}
