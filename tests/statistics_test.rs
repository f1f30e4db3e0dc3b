use outbreak_stats::{
    calculate_r_naught, contacts_by_depth, PassengerRegistry, PassengerSource, PassengerStatistics,
    R_NAUGHT_UNDEFINED,
};

/// 對應 rnaught_greaterthan_one：每天的新增人數翻倍
const DOUBLING: &str = r#"a1,"One, A",M,2020/03/01 08:00:00
b1,"Two, B",M,2020/03/02 08:00:00
b2,"Two, C",S,2020/03/02 09:00:00
c1,"Three, D",M,2020/03/03 08:00:00
c2,"Three, E",M,2020/03/03 09:00:00
c3,"Three, F",C,2020/03/03 10:00:00
c4,"Three, G",S,2020/03/03 11:00:00
h1,"Healthy, H",N
"#;

#[test]
fn test_statistics_from_registry() {
    let mut registry = PassengerRegistry::new();
    registry.import_passengers(DOUBLING).unwrap();

    let stats = PassengerStatistics::from_source(&registry);
    let totals: Vec<usize> = stats.total_infections_per_day().values().copied().collect();
    assert_eq!(totals, vec![1, 3, 7]);
    assert_eq!(stats.passenger_count(), 8);

    for i in 0..stats.dates().len() {
        let sum = stats.not_infected()[i] + stats.mild()[i] + stats.severe()[i] + stats.critical()[i];
        assert_eq!(sum, 8);
    }

    assert_eq!(calculate_r_naught(&registry.passengers()), 2.0);
}

#[test]
fn test_recomputing_after_delete_all() {
    let mut registry = PassengerRegistry::new();
    registry.import_passengers(DOUBLING).unwrap();
    let before = PassengerStatistics::from_source(&registry);
    assert_eq!(before, PassengerStatistics::from_source(&registry));

    registry.clear();
    let after = PassengerStatistics::from_source(&registry);
    assert!(after.new_infections_per_day().is_empty());
    assert!(after.severity().is_empty());
    assert_eq!(calculate_r_naught(&registry.passengers()), R_NAUGHT_UNDEFINED);
}

#[test]
fn test_contact_search_through_registry() {
    let mut registry = PassengerRegistry::new();
    registry.import_passengers(DOUBLING).unwrap();
    registry.import_contacts("a1,b1,b2\nb1,c1\nc1,h1\n").unwrap();

    let levels = contacts_by_depth(&registry, "a1", 3).unwrap();
    assert_eq!(levels[&1].len(), 2);
    assert_eq!(levels[&2][0].passenger_id, "c1");
    assert_eq!(levels[&3][0].name, "Healthy, H");
}
