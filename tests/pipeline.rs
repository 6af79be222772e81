//! End-to-end predictions over CSV session exports

use std::fs;
use std::path::{Path, PathBuf};

use podium::{
    PodiumError, PodiumPredictor, ReferenceData, TrackProfile, WeekendFiles, WeekendFormat,
};
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

const QUALIFYING: &str = "\
Pos,Driver,Team,Q1,Q2,Q3
1,VER,Red Bull,1:26.100,1:25.900,1:25.500
2,NOR,McLaren,1:26.200,1:26.000,1:25.700
3,LEC,Ferrari,1:26.300,1:26.100,1:25.800
4,HAM,Ferrari,1:26.400,1:26.200,1:25.950
5,RUS,Mercedes,1:26.500,1:26.300,1:26.000
";

const PRACTICE: &str = "\
Driver,FP1,FP2,FP3
Max Verstappen,1:28.000,1:27.400,1:26.800
Lando Norris,1:28.100,1:27.300,1:26.900
Charles Leclerc,1:28.200,1:27.600,1:27.000
Lewis Hamilton,1:28.300,1:27.700,1:27.100
George Russell,1:28.400,1:27.800,1:27.200
";

#[test]
fn test_grid_order_when_only_grid_differs() {
    let dir = TempDir::new().unwrap();
    let quali = write_csv(
        dir.path(),
        "quali.csv",
        "Pos,Driver,Team,Q1,Q2,Q3\n\
         1,Zed Alpha,Privateer,1:30.000,,\n\
         2,Zed Bravo,Privateer,1:30.100,,\n\
         3,Zed Charlie,Privateer,1:30.200,,\n",
    );
    let practice = write_csv(
        dir.path(),
        "practice.csv",
        "Driver,FP1,FP2,FP3\n\
         Zed Alpha,1:31.000,1:31.000,1:31.000\n\
         Zed Bravo,1:31.000,1:31.000,1:31.000\n\
         Zed Charlie,1:31.000,1:31.000,1:31.000\n",
    );

    let mut tables = ReferenceData::builtin().tables().clone();
    tables.tracks.push(TrackProfile {
        race: "Balanced Grand Prix".to_string(),
        circuit: "Balanced Circuit".to_string(),
        overtaking_difficulty: 5,
        tire_degradation: 5,
        start_importance: 5,
        is_sprint: false,
    });
    let reference = ReferenceData::from_tables(tables).unwrap();
    let predictor = PodiumPredictor::new(&reference, "Balanced Grand Prix", 0.0);
    assert_eq!(predictor.track().overtaking_factor(), 0.5);
    assert_eq!(predictor.track().degradation_factor(), 0.5);
    let result = predictor.run(&WeekendFiles::new(quali, practice)).unwrap();

    let order: Vec<(&str, i32)> = result
        .podium
        .iter()
        .map(|e| (e.record.driver.name.as_str(), e.position_change))
        .collect();
    assert_eq!(
        order,
        vec![("Zed Alpha", 0), ("Zed Bravo", 0), ("Zed Charlie", 0)]
    );
    assert_eq!(result.degraded_scores, 0);
}

#[test]
fn test_standard_weekend_end_to_end() {
    let dir = TempDir::new().unwrap();
    let files = WeekendFiles::new(
        write_csv(dir.path(), "quali.csv", QUALIFYING),
        write_csv(dir.path(), "practice.csv", PRACTICE),
    );

    let reference = ReferenceData::builtin();
    let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.2);
    let result = predictor.run(&files).unwrap();

    assert_eq!(result.format, WeekendFormat::Standard);
    assert_eq!(result.drivers_scored, 5);
    assert_eq!(result.podium.len(), 3);
    assert!((result.rain_probability - 0.2).abs() < 1e-12);

    let winner = result.winner().unwrap();
    assert_eq!(winner.predicted_position, 1);
    assert_eq!(winner.record.driver.code.as_deref(), Some("VER"));
    assert_eq!(winner.record.team, "Red Bull Racing Honda RBPT");

    for pair in result.podium.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for entry in &result.podium {
        assert!(entry.score > 0.0 && entry.score.is_finite());
        assert_eq!(
            entry.position_change,
            entry.record.grid_position as i32 - entry.predicted_position as i32
        );
    }

    let shares: f64 = winner
        .record
        .race_score
        .as_ref()
        .and_then(|s| s.breakdown())
        .unwrap()
        .shares()
        .iter()
        .map(|(_, share)| share)
        .sum();
    assert!((shares - 100.0).abs() < 1e-6);

    assert!((result.rmse() - result.mse().sqrt()).abs() < 1e-12);
    assert!(
        (result.confidence() - (100.0 - 25.0 * result.rmse() - 10.0 * 0.2)).abs() < 1e-9
    );
}

#[test]
fn test_sprint_weekend_end_to_end() {
    let dir = TempDir::new().unwrap();
    let sprint = write_csv(
        dir.path(),
        "sprint.csv",
        "POS,DRIVER,CAR,TIME/RETIRED\n\
         1,Lando Norris,McLaren,30:10.500\n\
         2,Max Verstappen,Red Bull,+1.200\n\
         3,Charles Leclerc,Ferrari,+3.400\n\
         4,George Russell,Mercedes,DNF\n",
    );
    let sprint_quali = write_csv(
        dir.path(),
        "sprint_quali.csv",
        "Pos,Driver,SQ1,SQ2,SQ3\n\
         1,NOR,1:33.000,1:32.500,1:32.000\n\
         2,VER,1:33.100,1:32.600,1:32.100\n",
    );
    let files = WeekendFiles::new(
        write_csv(dir.path(), "quali.csv", QUALIFYING),
        write_csv(dir.path(), "practice.csv", PRACTICE),
    )
    .with_sprint(sprint)
    .with_sprint_qualifying(sprint_quali);

    let reference = ReferenceData::builtin();
    let predictor = PodiumPredictor::new(&reference, "Miami Grand Prix", 0.0);
    let result = predictor.run(&files).unwrap();

    assert_eq!(result.format, WeekendFormat::Sprint);
    assert_eq!(result.podium.len(), 3);
    assert!(!result
        .notices
        .iter()
        .any(|n| n.contains("no sprint race data")));

    let weekend = predictor.load(&files).unwrap();
    let norris = weekend.get("Lando Norris").unwrap();
    assert_eq!(norris.sprint_position, Some(1));
    assert!((norris.sprint_time_seconds.unwrap() - 1810.5).abs() < 1e-9);
    assert_eq!(norris.sprint_quali_position, Some(1));
    assert_eq!(norris.gap_to_sprint_pole, Some(0.0));

    let verstappen = weekend.get("Max Verstappen").unwrap();
    assert_eq!(verstappen.sprint_position, Some(2));
    assert_eq!(verstappen.sprint_time_seconds, None);

    // Sprint weekends skip P2/P3 scoring
    assert!(norris.p2_score.is_none());
    assert!(norris.p3_score.is_none());
    assert!(norris.p1_score.is_some());
}

#[test]
fn test_sprint_files_ignored_on_standard_weekend() {
    let dir = TempDir::new().unwrap();
    let files = WeekendFiles::new(
        write_csv(dir.path(), "quali.csv", QUALIFYING),
        write_csv(dir.path(), "practice.csv", PRACTICE),
    )
    .with_sprint(dir.path().join("missing_sprint.csv"));

    let reference = ReferenceData::builtin();
    let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
    let weekend = predictor.load(&files).unwrap();
    assert!(weekend
        .records()
        .iter()
        .all(|r| r.sprint_position.is_none()));
}

#[test]
fn test_latin1_export_is_decoded() {
    let dir = TempDir::new().unwrap();
    let mut quali = b"Pos,Driver,Team,Q1,Q2,Q3\n".to_vec();
    quali.extend_from_slice(b"1,Nico H\xfclkenberg,Sauber,1:20.000,1:19.800,1:19.500\n");
    quali.extend_from_slice(b"2,LEC,Ferrari,1:20.100,1:19.900,1:19.600\n");
    quali.extend_from_slice(b"3,NOR,McLaren,1:20.200,1:20.000,1:19.700\n");
    let quali_path = dir.path().join("quali.csv");
    fs::write(&quali_path, quali).unwrap();

    let practice = write_csv(
        dir.path(),
        "practice.csv",
        "Driver,FP1,FP2,FP3\nCharles Leclerc,1:21.000,1:20.500,1:20.000\n",
    );

    let reference = ReferenceData::builtin();
    let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
    let weekend = predictor
        .load(&WeekendFiles::new(quali_path, practice))
        .unwrap();

    assert_eq!(weekend.len(), 3);
    assert!(weekend.get("Nico H\u{fc}lkenberg").is_some());
}

#[test]
fn test_missing_driver_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let files = WeekendFiles::new(
        write_csv(
            dir.path(),
            "quali.csv",
            "Pos,Team,Q1\n1,Ferrari,1:20.000\n",
        ),
        write_csv(dir.path(), "practice.csv", PRACTICE),
    );

    let reference = ReferenceData::builtin();
    let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
    match predictor.run(&files) {
        Err(PodiumError::MissingColumn { table, role }) => {
            assert_eq!(table, "Qualifying");
            assert_eq!(role, "driver");
        }
        other => panic!("expected missing column error, got {:?}", other.map(|r| r.race)),
    }
}

#[test]
fn test_empty_qualifying_has_no_drivers() {
    let dir = TempDir::new().unwrap();
    let files = WeekendFiles::new(
        write_csv(dir.path(), "quali.csv", "Pos,Driver,Team,Q1\n"),
        write_csv(dir.path(), "practice.csv", PRACTICE),
    );

    let reference = ReferenceData::builtin();
    let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
    assert!(matches!(
        predictor.run(&files),
        Err(PodiumError::NoDrivers { .. })
    ));
}

#[test]
fn test_custom_reference_file() {
    let dir = TempDir::new().unwrap();
    let mut tables = ReferenceData::builtin().tables().clone();
    for track in &mut tables.tracks {
        if track.race == "Monaco Grand Prix" {
            track.is_sprint = true;
        }
    }
    let json_path = dir.path().join("reference.json");
    fs::write(&json_path, serde_json::to_string(&tables).unwrap()).unwrap();

    let reference = ReferenceData::from_json_file(&json_path).unwrap();
    let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
    assert_eq!(predictor.format(), WeekendFormat::Sprint);
}
