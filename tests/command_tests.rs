//! Command dispatch tests

#[cfg(test)]
mod tests {
    use waypoint_nav::command::{dispatch, CommandHost};
    use waypoint_nav::service::WaypointSession;
    use waypoint_nav::storage::WaypointStore;
    use waypoint_nav::types::{SessionConfig, WaypointGroup, WaypointPoint};

    struct MockHost {
        position: Option<(f64, f64, f64)>,
        clipboard: Option<String>,
    }

    impl MockHost {
        fn at(x: f64, y: f64, z: f64) -> Self {
            Self {
                position: Some((x, y, z)),
                clipboard: None,
            }
        }
    }

    impl CommandHost for MockHost {
        fn player_position(&self) -> Option<(f64, f64, f64)> {
            self.position
        }
        fn clipboard_get(&self) -> Option<String> {
            self.clipboard.clone()
        }
        fn clipboard_set(&mut self, text: String) {
            self.clipboard = Some(text);
        }
    }

    fn make_session(dir: &tempfile::TempDir) -> WaypointSession {
        let store = WaypointStore::new(dir.path().join("wp.json"));
        WaypointSession::new(store, &SessionConfig::default())
    }

    fn numbered_route(name: &str, n: usize) -> WaypointGroup {
        let mut group = WaypointGroup::new(name);
        for i in 0..n {
            group
                .waypoints
                .push(WaypointPoint::new(i as f64, 0.0, 0.0, (i + 1).to_string()));
        }
        group
    }

    // -----------------------------------------------------------------------
    // Group lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn create_load_add_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(10.7, 65.2, -3.4);

        dispatch(&mut session, &mut host, "create quarry my mining route");
        let group = session.store.group("quarry").unwrap();
        assert_eq!(group.description, "my mining route");

        dispatch(&mut session, &mut host, "load quarry");
        assert!(session.nav.loaded_group().is_some());

        dispatch(&mut session, &mut host, "add");
        let group = session.store.group("quarry").unwrap();
        assert_eq!(group.len(), 1);
        // Placed on the block under the feet, default 1-based label.
        assert_eq!(group.waypoints[0], WaypointPoint::new(10.0, 64.0, -4.0, "1"));
        // The loaded working copy sees the edit immediately.
        assert_eq!(session.nav.size(), 1);
    }

    #[test]
    fn create_rejects_an_existing_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        dispatch(&mut session, &mut host, "create quarry");
        let out = dispatch(&mut session, &mut host, "create QUARRY");
        assert!(out[0].contains("already exists"));
    }

    #[test]
    fn add_into_a_named_group_without_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(1.0, 70.0, 1.0);
        session.store.put_group(WaypointGroup::new("mine"));

        dispatch(&mut session, &mut host, "add mine entrance");
        let group = session.store.group("mine").unwrap();
        assert_eq!(group.waypoints[0].name, "entrance");
        assert!(session.nav.loaded_group().is_none());
    }

    #[test]
    fn deleting_the_loaded_group_unloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("mine", 2));

        dispatch(&mut session, &mut host, "load mine");
        dispatch(&mut session, &mut host, "delete mine");
        assert!(session.nav.loaded_group().is_none());
        assert!(session.store.group("mine").is_none());
    }

    #[test]
    fn rename_moves_the_storage_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("old", 2));

        let out = dispatch(&mut session, &mut host, "rename old new");
        assert!(out[0].contains("Renamed"));
        assert!(session.store.group("new").is_some());
        assert!(session.store.group("old").is_none());
    }

    // -----------------------------------------------------------------------
    // Navigation commands
    // -----------------------------------------------------------------------

    #[test]
    fn skip_and_unskip_wrap_circularly() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("r", 3));
        dispatch(&mut session, &mut host, "load r");

        dispatch(&mut session, &mut host, "unskip");
        assert_eq!(session.nav.current_index(), 2);
        dispatch(&mut session, &mut host, "skip 2");
        assert_eq!(session.nav.current_index(), 1);
    }

    #[test]
    fn skipto_validates_its_one_based_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("r", 3));
        dispatch(&mut session, &mut host, "load r");

        let out = dispatch(&mut session, &mut host, "skipto 4");
        assert!(out[0].contains("out of range"));
        assert_eq!(session.nav.current_index(), 0);

        let out = dispatch(&mut session, &mut host, "skipto 0");
        assert!(out[0].contains("out of range"));

        dispatch(&mut session, &mut host, "skipto 3");
        assert_eq!(session.nav.current_index(), 2);
    }

    #[test]
    fn navigation_without_a_group_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        for cmd in ["reset", "skip", "unskip", "skipto 1", "insert 1", "remove 1", "info"] {
            let out = dispatch(&mut session, &mut host, cmd);
            assert_eq!(out[0], "No group loaded.", "for command '{}'", cmd);
        }
    }

    #[test]
    fn enable_disable_and_setup_toggle_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        dispatch(&mut session, &mut host, "disable");
        assert!(!session.nav.enabled);
        dispatch(&mut session, &mut host, "enable");
        assert!(session.nav.enabled);

        dispatch(&mut session, &mut host, "setup");
        assert!(session.nav.setup_mode);
        dispatch(&mut session, &mut host, "setup");
        assert!(!session.nav.setup_mode);
    }

    // -----------------------------------------------------------------------
    // Insert / renumber
    // -----------------------------------------------------------------------

    #[test]
    fn insert_renumbers_sequential_numeric_labels() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(50.0, 64.0, 50.0);
        session.store.put_group(numbered_route("r", 3));
        dispatch(&mut session, &mut host, "load r");

        // ["1","2","3"] + insert "x" at position 2 -> ["1","x","3","4"]:
        // the shifted "2" and "3" matched their old sequential spots and get
        // bumped; "x" is not numeric and is left alone.
        dispatch(&mut session, &mut host, "insert 2 x");
        let names: Vec<String> = session
            .store
            .group("r")
            .unwrap()
            .waypoints
            .iter()
            .map(|wp| wp.name.clone())
            .collect();
        assert_eq!(names, vec!["1", "x", "3", "4"]);
    }

    #[test]
    fn insert_leaves_out_of_sync_labels_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        let mut group = WaypointGroup::new("r");
        for name in ["1", "renamed", "9"] {
            group.waypoints.push(WaypointPoint::new(0.0, 0.0, 0.0, name));
        }
        session.store.put_group(group);
        dispatch(&mut session, &mut host, "load r");

        dispatch(&mut session, &mut host, "insert 1 start");
        let names: Vec<String> = session
            .store
            .group("r")
            .unwrap()
            .waypoints
            .iter()
            .map(|wp| wp.name.clone())
            .collect();
        // "1" sat at 0-based 0 before, now at 1 with value 1 -> bumped to "2";
        // "renamed" and "9" were already out of sync and stay untouched.
        assert_eq!(names, vec!["start", "2", "renamed", "9"]);
    }

    #[test]
    fn insert_validates_its_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("r", 2));
        dispatch(&mut session, &mut host, "load r");

        let out = dispatch(&mut session, &mut host, "insert 4");
        assert!(out[0].contains("out of range"));
        // One past the end is a legal append position.
        dispatch(&mut session, &mut host, "insert 3");
        assert_eq!(session.nav.size(), 3);
    }

    #[test]
    fn remove_takes_a_one_based_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("r", 3));
        dispatch(&mut session, &mut host, "load r");

        let out = dispatch(&mut session, &mut host, "remove 2");
        assert!(out[0].contains("Removed waypoint 2"));
        let group = session.store.group("r").unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.waypoints[1].name, "3");

        let out = dispatch(&mut session, &mut host, "remove 5");
        assert!(out[0].contains("out of range"));
    }

    // -----------------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------------

    #[test]
    fn export_then_import_round_trips_through_the_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("src", 3));

        let out = dispatch(&mut session, &mut host, "export src");
        assert!(out[0].contains("Copied 3 waypoints"));
        assert!(host.clipboard.is_some());

        dispatch(&mut session, &mut host, "import copy");
        let copy = session.store.group("copy").unwrap();
        assert_eq!(copy.waypoints, numbered_route("src", 3).waypoints);
    }

    #[test]
    fn import_with_empty_clipboard_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        host.clipboard = None;

        let out = dispatch(&mut session, &mut host, "import fresh");
        assert_eq!(out[0], "Clipboard is empty.");
    }

    #[test]
    fn unparsable_clipboard_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        host.clipboard = Some("certainly not waypoints".into());

        let out = dispatch(&mut session, &mut host, "import fresh");
        assert!(out[0].contains("Could not parse"));
        assert!(session.store.group("fresh").is_none());
    }

    #[test]
    fn export_without_loaded_group_needs_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        let out = dispatch(&mut session, &mut host, "export");
        assert!(out[0].contains("No group loaded"));
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    #[test]
    fn range_and_time_get_and_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        let out = dispatch(&mut session, &mut host, "range");
        assert!(out[0].contains("Current advance range: 5"));

        dispatch(&mut session, &mut host, "range 8.5");
        assert_eq!(session.nav.advance_range, 8.5);

        let out = dispatch(&mut session, &mut host, "range -2");
        assert_eq!(out[0], "Invalid range.");
        assert_eq!(session.nav.advance_range, 8.5);

        dispatch(&mut session, &mut host, "time 500");
        assert_eq!(session.nav.advance_delay_ms, 500);

        let out = dispatch(&mut session, &mut host, "time nope");
        assert_eq!(out[0], "Invalid delay.");
        assert_eq!(session.nav.advance_delay_ms, 500);
    }

    // -----------------------------------------------------------------------
    // Misc surface
    // -----------------------------------------------------------------------

    #[test]
    fn empty_input_lists_groups() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        let out = dispatch(&mut session, &mut host, "");
        assert!(out[0].contains("Waypoint Groups"));
        assert!(out[1].contains("No groups saved"));

        session.store.put_group(numbered_route("mine", 2));
        let out = dispatch(&mut session, &mut host, "list");
        assert!(out.iter().any(|l| l.contains("mine (2 wps)")));
    }

    #[test]
    fn unknown_subcommand_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);

        let out = dispatch(&mut session, &mut host, "frobnicate");
        assert!(out[0].contains("Unknown subcommand 'frobnicate'"));
    }

    #[test]
    fn info_summarizes_the_loaded_route() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost::at(0.0, 0.0, 0.0);
        session.store.put_group(numbered_route("mine", 3));
        dispatch(&mut session, &mut host, "load mine");
        dispatch(&mut session, &mut host, "skipto 2");

        let out = dispatch(&mut session, &mut host, "info");
        assert!(out[0].contains("Group: mine"));
        assert!(out[0].contains("At: 2/3"));
        assert!(out.iter().any(|l| l.starts_with("Current: 2")));
        assert!(out.iter().any(|l| l.starts_with("Next:    3")));
    }

    #[test]
    fn missing_player_position_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = make_session(&dir);
        let mut host = MockHost {
            position: None,
            clipboard: None,
        };
        session.store.put_group(numbered_route("r", 1));
        dispatch(&mut session, &mut host, "load r");

        let out = dispatch(&mut session, &mut host, "add");
        assert_eq!(out[0], "No player position available.");
    }
}
