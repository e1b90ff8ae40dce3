use yahoo_fantasy::api::{
    FilterSet, GameKey, PlayersQuery, ResourceKind, ResourceRouter, TeamsQuery, serialize_filters,
};
use yahoo_fantasy::error::AppError;

fn router() -> ResourceRouter {
    ResourceRouter::new(GameKey::new(385))
}

/// A URL for every valid sub-resource of the single-key resources, each
/// ending in that sub-resource.
#[test]
fn test_valid_subresources_end_the_path() {
    let router = router();
    let cases: Vec<(ResourceKind, Box<dyn Fn(&str) -> Result<String, AppError>>)> = vec![
        (ResourceKind::League, Box::new(|s| router.league(1, s))),
        (ResourceKind::Player, Box::new(|s| router.player("385.p.1", s))),
        (ResourceKind::Team, Box::new(|s| router.team("385.l.1.t.1", s))),
        (
            ResourceKind::Transaction,
            Box::new(|s| router.transaction("385.l.1.tr.2", s)),
        ),
        (
            ResourceKind::Leagues,
            Box::new(|s| router.leagues(&["385.l.1"], s)),
        ),
        (
            ResourceKind::Transactions,
            Box::new(|s| router.transactions(1, s, None)),
        ),
        (ResourceKind::Roster, Box::new(|s| router.roster("385.l.1.t.1", s, None))),
        (
            ResourceKind::Players,
            Box::new(|s| router.players(&PlayersQuery::new().league(1).subresource(s))),
        ),
        (
            ResourceKind::Teams,
            Box::new(|s| router.teams(&TeamsQuery::new().league(1).subresource(s))),
        ),
    ];

    for (kind, build) in &cases {
        for subresource in kind.spec().subresource_names() {
            let url = build(subresource)
                .unwrap_or_else(|e| panic!("{kind} {subresource} should be valid: {e}"));
            assert_eq!(
                url.rsplit('/').next(),
                Some(subresource),
                "{kind}: {url} should end with {subresource}"
            );
        }

        let err = build("definitely_not_a_subresource").unwrap_err();
        assert!(
            matches!(err, AppError::InvalidSubresource { ref subresource, .. } if subresource == "definitely_not_a_subresource"),
            "{kind} accepted an invalid sub-resource"
        );
        assert!(err.is_validation_error());
    }
}

#[test]
fn test_game_keyed_subresources() {
    let router = router();
    assert_eq!(
        router.game("players", &["385.p.1", "385.p.2"]).unwrap(),
        "https://fantasysports.yahooapis.com/fantasy/v2/game/385/players;player_keys=385.p.1,385.p.2"
    );
    let err = router.game("leagues", &[] as &[&str]).unwrap_err();
    assert!(matches!(err, AppError::MissingKeys { .. }));
}

#[test]
fn test_filter_serialization_is_order_independent() {
    let forward = serialize_filters([("a", 1), ("b", 2)]);
    let backward = serialize_filters([("b", 2), ("a", 1)]);
    assert_eq!(forward, "a=1,b=2");
    assert_eq!(forward, backward);
}

#[test]
fn test_unknown_filter_rejected_among_valid_ones() {
    let err = FilterSet::new(
        ResourceKind::Players,
        [("sort", "AR"), ("status", "FA"), ("flavour", "salty")],
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidFilter { ref filter, .. } if filter == "flavour"));

    let err = FilterSet::new(ResourceKind::League, [("count", "5")]).unwrap_err();
    assert!(matches!(err, AppError::InvalidFilter { .. }));
}

#[test]
fn test_teams_addressing_must_be_unique() {
    let router = router();
    let both = TeamsQuery::new().league(1).teams(["385.l.1.t.1"]);
    assert!(matches!(
        router.teams(&both),
        Err(AppError::AmbiguousOrMissingAddressing { .. })
    ));
    assert!(matches!(
        router.teams(&TeamsQuery::new()),
        Err(AppError::AmbiguousOrMissingAddressing { .. })
    ));
    assert_eq!(
        router
            .teams(&TeamsQuery::new().teams(["385.l.1.t.1", "385.l.1.t.2"]))
            .unwrap(),
        "https://fantasysports.yahooapis.com/fantasy/v2/teams;team_keys=385.l.1.t.1,385.l.1.t.2/metadata"
    );
}

#[test]
fn test_unknown_game_is_not_defaulted() {
    use yahoo_fantasy::api::Sport;
    assert_eq!(GameKey::resolve(Sport::Nba, 2018).unwrap(), GameKey::new(385));
    assert!(matches!(
        GameKey::resolve(Sport::Mlb, 2018),
        Err(AppError::UnknownGameKey { .. })
    ));
}
