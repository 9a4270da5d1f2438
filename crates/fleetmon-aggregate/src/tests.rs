use chrono::{DateTime, Duration, TimeZone, Utc};
use fleetmon_common::health::status_for_score;
use fleetmon_common::types::{
    CloudProvider, CostBreakdown, CostForecast, CostTrend, Database, DatabaseCost, DbEngine,
    Environment, HealthStatus, ResourceMetrics, Trend,
};
use fleetmon_synth::billing::generate_database_costs;
use fleetmon_synth::database::generate_databases;
use fleetmon_synth::issue::generate_issues;
use fleetmon_synth::FleetRng;
use std::collections::BTreeMap;

use crate::cloud::aggregate_by_cloud;
use crate::geo::{marker_color, marker_size, region_markers};
use crate::group::{all_regions, group_by_cloud_and_region, region_groups};
use crate::overview::fleet_overview;
use crate::tree::{build_database_tree, databases_for_node, NodeKind, MAX_TREE_DATABASES};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn make_db(id: &str, cloud: CloudProvider, region: &str, score: i32) -> Database {
    let now = fixed_now();
    Database {
        id: id.to_string(),
        name: format!("{id}-name"),
        engine: DbEngine::Postgres,
        cloud,
        region: region.to_string(),
        environment: Environment::Production,
        health_score: score,
        health_status: status_for_score(score),
        health_trend: Trend::Stable,
        metrics: ResourceMetrics {
            cpu: 30.0,
            memory: 40.0,
            storage: 50.0,
            connections: 20,
            max_connections: 100,
            latency_ms: 20.0,
            throughput_qps: 900.0,
        },
        active_issues: 0,
        recent_changes: 0,
        monthly_cost: 100.0,
        cost_trend: Trend::Stable,
        created_at: now - Duration::days(100),
        last_checked: now - Duration::minutes(2),
        tags: BTreeMap::new(),
    }
}

fn make_cost(id: &str, change_percent: f64) -> DatabaseCost {
    DatabaseCost {
        database_id: id.to_string(),
        database_name: format!("{id}-name"),
        total_cost: 100.0,
        breakdown: CostBreakdown {
            compute: 50.0,
            storage: 30.0,
            backup: 8.0,
            data_transfer: 7.0,
            other: 5.0,
        },
        trend: CostTrend {
            change_percent,
            direction: Trend::Stable,
        },
        forecast: CostForecast {
            next_month: 100.0,
            confidence: 80,
        },
    }
}

fn synth_fleet(seed: u64, count: usize) -> Vec<Database> {
    let mut rng = FleetRng::seeded(seed);
    generate_databases(&mut rng, count, fixed_now())
}

#[test]
fn empty_fleet_produces_empty_views() {
    let fleet: Vec<Database> = Vec::new();

    assert!(group_by_cloud_and_region(&fleet).is_empty());
    assert!(all_regions(&fleet).is_empty());
    assert!(region_groups(&fleet).is_empty());
    assert!(aggregate_by_cloud(&fleet).is_empty());
    assert!(build_database_tree(&fleet).is_empty());
    assert!(region_markers(&fleet).is_empty());

    let overview = fleet_overview(&fleet, &[], &[]);
    assert_eq!(overview.total_databases, 0);
    assert_eq!(overview.avg_health_score, 0.0);
    assert_eq!(overview.total_monthly_cost, 0.0);
    assert_eq!(overview.avg_cost_trend_percent, 0.0);
    assert!(overview.top_issues.is_empty());
}

#[test]
fn single_database_aggregate_mirrors_its_record() {
    let fleet = vec![make_db("db-1", CloudProvider::Gcp, "us-central1", 82)];
    let aggregates = aggregate_by_cloud(&fleet);

    assert_eq!(aggregates.len(), 1);
    let agg = &aggregates[0];
    assert_eq!(agg.cloud, CloudProvider::Gcp);
    assert_eq!(agg.database_count, 1);
    assert_eq!(agg.warning_count, 1);
    assert_eq!(agg.healthy_count, 0);
    assert_eq!(agg.avg_health_score, 82.0);
    assert_eq!(agg.monthly_cost, 100.0);
    assert_eq!(agg.regions.len(), 1);
    assert_eq!(agg.regions[0].region, "us-central1");
    assert_eq!(agg.regions[0].avg_health_score, 82.0);
}

#[test]
fn grouping_only_contains_present_clouds() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 90),
        make_db("db-2", CloudProvider::Gcp, "us-central1", 90),
    ];
    let grouped = group_by_cloud_and_region(&fleet);

    assert!(grouped.contains_key(&CloudProvider::Aws));
    assert!(grouped.contains_key(&CloudProvider::Gcp));
    assert!(!grouped.contains_key(&CloudProvider::Azure));

    let aggregates = aggregate_by_cloud(&fleet);
    assert_eq!(aggregates.len(), 2);
    assert!(aggregates.iter().all(|a| a.cloud != CloudProvider::Azure));
}

#[test]
fn region_groups_tally_health_buckets() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 50),
        make_db("db-2", CloudProvider::Aws, "us-east-1", 75),
        make_db("db-3", CloudProvider::Aws, "us-east-1", 96),
        make_db("db-4", CloudProvider::Aws, "eu-west-1", 88),
    ];
    let groups = region_groups(&fleet);
    assert_eq!(groups.len(), 2);

    let east = groups.iter().find(|g| g.region == "us-east-1").unwrap();
    assert_eq!(east.databases.len(), 3);
    assert_eq!(east.critical_count, 1);
    assert_eq!(east.warning_count, 1);
    assert_eq!(east.healthy_count, 1);

    assert_eq!(all_regions(&fleet), vec!["eu-west-1", "us-east-1"]);
}

#[test]
fn tree_truncates_region_leaves_but_counts_everything() {
    let fleet: Vec<Database> = (1..=8)
        .map(|i| make_db(&format!("db-{i}"), CloudProvider::Aws, "us-east-1", 90))
        .collect();
    let tree = build_database_tree(&fleet);

    assert_eq!(tree.len(), 1);
    let cloud = &tree[0];
    assert_eq!(cloud.kind, NodeKind::Cloud);
    assert_eq!(cloud.id, "cloud-aws");
    assert_eq!(cloud.label, "AWS");
    assert_eq!(cloud.healthy_count, 8);

    assert_eq!(cloud.children.len(), 1);
    let region = &cloud.children[0];
    assert_eq!(region.kind, NodeKind::Region);
    assert_eq!(region.id, "region-aws-us-east-1");
    assert_eq!(region.children.len(), MAX_TREE_DATABASES);
    assert_eq!(region.healthy_count, 8, "counts must cover truncated leaves too");
}

#[test]
fn tree_orders_clouds_alphabetically_and_regions_by_severity() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Gcp, "us-central1", 90),
        make_db("db-2", CloudProvider::Azure, "eastus", 90),
        make_db("db-3", CloudProvider::Aws, "aa-calm", 92),
        make_db("db-4", CloudProvider::Aws, "zz-burning", 45),
        make_db("db-5", CloudProvider::Aws, "mm-warned", 72),
    ];
    let tree = build_database_tree(&fleet);

    let labels: Vec<&str> = tree.iter().map(|node| node.label.as_str()).collect();
    assert_eq!(labels, vec!["AWS", "AZURE", "GCP"]);

    let aws_regions: Vec<&str> = tree[0]
        .children
        .iter()
        .map(|node| node.label.as_str())
        .collect();
    assert_eq!(aws_regions, vec!["zz-burning", "mm-warned", "aa-calm"]);
}

#[test]
fn tree_leaves_sort_worst_first_with_prefixed_ids() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 97),
        make_db("db-2", CloudProvider::Aws, "us-east-1", 50),
        make_db("db-3", CloudProvider::Aws, "us-east-1", 75),
    ];
    let tree = build_database_tree(&fleet);
    let region = &tree[0].children[0];

    let leaf_ids: Vec<&str> = region.children.iter().map(|leaf| leaf.id.as_str()).collect();
    assert_eq!(leaf_ids, vec!["db-db-2", "db-db-3", "db-db-1"]);

    let first = &region.children[0];
    assert_eq!(first.kind, NodeKind::Database);
    assert_eq!(first.critical_count, 1);
    assert_eq!(first.healthy_count, 0);
    assert!(first.database.is_some());
}

#[test]
fn tree_nodes_serialize_with_lowercase_kinds() {
    let fleet = vec![make_db("db-1", CloudProvider::Aws, "us-east-1", 90)];
    let tree = build_database_tree(&fleet);
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json[0]["kind"], "cloud");
    assert_eq!(json[0]["children"][0]["kind"], "region");
    assert_eq!(json[0]["children"][0]["children"][0]["kind"], "database");

    // Only leaves carry the database record.
    assert!(json[0].get("database").is_none());
    assert!(json[0]["children"][0]["children"][0].get("database").is_some());
}

#[test]
fn databases_for_node_resolves_each_kind() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 90),
        make_db("db-2", CloudProvider::Aws, "eu-west-1", 90),
        make_db("db-3", CloudProvider::Gcp, "us-central1", 90),
    ];
    let tree = build_database_tree(&fleet);

    let aws = &tree[0];
    assert_eq!(databases_for_node(aws, &fleet).len(), 2);

    let region = aws
        .children
        .iter()
        .find(|node| node.label == "eu-west-1")
        .unwrap();
    let resolved = databases_for_node(region, &fleet);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, "db-2");

    let leaf = &region.children[0];
    let resolved = databases_for_node(leaf, &fleet);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, "db-2");
}

#[test]
fn markers_use_table_coordinates_with_center_fallback() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 90),
        make_db("db-2", CloudProvider::Azure, "WESTEUROPE", 90),
        make_db("db-3", CloudProvider::Gcp, "mars-north-1", 90),
    ];
    let markers = region_markers(&fleet);
    assert_eq!(markers.len(), 3);

    let east = markers.iter().find(|m| m.region == "us-east-1").unwrap();
    assert_eq!((east.x, east.y), (22.0, 35.0));

    // Lookup ignores case.
    let europe = markers.iter().find(|m| m.region == "WESTEUROPE").unwrap();
    assert_eq!((europe.x, europe.y), (51.0, 28.0));

    let unknown = markers.iter().find(|m| m.region == "mars-north-1").unwrap();
    assert_eq!((unknown.x, unknown.y), (50.0, 50.0));
}

#[test]
fn marker_color_and_size_scale_with_contents() {
    let healthy: Vec<Database> = (1..=2)
        .map(|i| make_db(&format!("db-{i}"), CloudProvider::Aws, "us-east-1", 96))
        .collect();
    let markers = region_markers(&healthy);
    assert_eq!(marker_color(&markers[0]), "#22c55e");
    assert_eq!(marker_size(&markers[0]), 16);

    let mut warned: Vec<Database> = (1..=4)
        .map(|i| make_db(&format!("db-{i}"), CloudProvider::Aws, "us-east-1", 96))
        .collect();
    warned.push(make_db("db-5", CloudProvider::Aws, "us-east-1", 75));
    let markers = region_markers(&warned);
    assert_eq!(marker_color(&markers[0]), "#eab308");
    assert_eq!(marker_size(&markers[0]), 20);

    let mut burning: Vec<Database> = (1..=10)
        .map(|i| make_db(&format!("db-{i}"), CloudProvider::Aws, "us-east-1", 96))
        .collect();
    burning.push(make_db("db-11", CloudProvider::Aws, "us-east-1", 45));
    let markers = region_markers(&burning);
    assert_eq!(marker_color(&markers[0]), "#ef4444");
    assert_eq!(marker_size(&markers[0]), 28);
}

#[test]
fn dominant_trend_is_majority_vote_with_tie_to_stable() {
    let mut fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 90),
        make_db("db-2", CloudProvider::Aws, "us-east-1", 90),
        make_db("db-3", CloudProvider::Aws, "us-east-1", 90),
    ];
    fleet[0].cost_trend = Trend::Up;
    fleet[1].cost_trend = Trend::Up;
    fleet[2].cost_trend = Trend::Down;
    assert_eq!(aggregate_by_cloud(&fleet)[0].dominant_cost_trend, Trend::Up);

    // 1-1 tie between up and down.
    fleet[1].cost_trend = Trend::Down;
    fleet[2].cost_trend = Trend::Stable;
    assert_eq!(aggregate_by_cloud(&fleet)[0].dominant_cost_trend, Trend::Stable);

    fleet[0].cost_trend = Trend::Down;
    assert_eq!(aggregate_by_cloud(&fleet)[0].dominant_cost_trend, Trend::Down);
}

#[test]
fn region_top_issue_sentences_fire_at_thresholds() {
    let mut hot = make_db("db-1", CloudProvider::Aws, "us-east-1", 55);
    hot.metrics.cpu = 92.0;
    hot.metrics.memory = 88.0;
    hot.metrics.storage = 86.0;
    hot.metrics.connections = 95;
    hot.metrics.latency_ms = 150.0;
    let calm = make_db("db-2", CloudProvider::Aws, "us-east-1", 96);

    let fleet = vec![hot, calm];
    let aggregates = aggregate_by_cloud(&fleet);
    let issues = &aggregates[0].regions[0].top_issues;

    assert_eq!(issues.len(), 5);
    assert!(issues.contains(&"High CPU on db-1-name (92%)".to_string()));
    assert!(issues.contains(&"High memory on db-1-name (88%)".to_string()));
    assert!(issues.contains(&"Storage almost full on db-1-name (86%)".to_string()));
    assert!(issues.contains(&"Connection pool near limit on db-1-name (95/100)".to_string()));
    assert!(issues.contains(&"Elevated latency on db-1-name (150ms)".to_string()));
}

#[test]
fn synth_fleet_cloud_rollups_reconcile() {
    let fleet = synth_fleet(31, 40);
    let aggregates = aggregate_by_cloud(&fleet);

    let total: usize = aggregates.iter().map(|a| a.database_count).sum();
    assert_eq!(total, fleet.len());

    for agg in &aggregates {
        let members: Vec<&Database> = fleet.iter().filter(|db| db.cloud == agg.cloud).collect();
        assert_eq!(agg.database_count, members.len());

        let unknown = members
            .iter()
            .filter(|db| db.health_status == HealthStatus::Unknown)
            .count();
        assert_eq!(
            agg.healthy_count + agg.warning_count + agg.critical_count + unknown,
            agg.database_count
        );

        let cost: f64 = members.iter().map(|db| db.monthly_cost).sum();
        assert!((agg.monthly_cost - cost).abs() < 1e-6);

        let region_total: usize = agg.regions.iter().map(|r| r.database_count).sum();
        assert_eq!(region_total, agg.database_count);
    }
}

#[test]
fn fleet_overview_totals_and_top_issues() {
    let fleet = synth_fleet(32, 60);
    let mut rng = FleetRng::seeded(32);
    let issues = generate_issues(&mut rng, &fleet, fixed_now());
    let costs = generate_database_costs(&mut rng, &fleet);

    let overview = fleet_overview(&fleet, &issues, &costs);
    assert_eq!(overview.total_databases, 60);
    assert_eq!(
        overview.healthy_count
            + overview.warning_count
            + overview.critical_count
            + overview.unknown_count,
        60
    );
    assert_eq!(overview.active_issue_count, issues.len());
    assert!(overview.top_issues.len() <= 5);
    for pair in overview.top_issues.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }

    let cloud_total: usize = overview.by_cloud.values().sum();
    assert_eq!(cloud_total, 60);
    let engine_total: usize = overview.by_engine.values().sum();
    assert_eq!(engine_total, 60);

    // Trend draws live in [-10, +30], so the mean does too.
    assert!(overview.avg_cost_trend_percent >= -10.0);
    assert!(overview.avg_cost_trend_percent <= 30.0);
}

#[test]
fn overview_averages_cost_trend_percent() {
    let fleet = vec![
        make_db("db-1", CloudProvider::Aws, "us-east-1", 90),
        make_db("db-2", CloudProvider::Gcp, "us-central1", 90),
        make_db("db-3", CloudProvider::Azure, "eastus", 90),
    ];
    let costs = vec![
        make_cost("db-1", 12.0),
        make_cost("db-2", -4.5),
        make_cost("db-3", 1.5),
    ];

    let overview = fleet_overview(&fleet, &[], &costs);
    assert!((overview.avg_cost_trend_percent - 3.0).abs() < 1e-9);
}
