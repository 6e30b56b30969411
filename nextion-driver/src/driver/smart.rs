//! Directory-aware accessors
//!
//! "Smart" operations look a component up in the loaded directory and only
//! address it by name when its kind supports the attribute. Otherwise they
//! fall back to the caller's name, or to the synthesized `p[page].b[id]`
//! address for page/id lookups.

use nextion_hal::{Clock, SerialPort};
use nextion_protocol::{Command, ComponentKind, Target};

use super::Nextion;
use crate::directory::{Component, ComponentName, Directory};
use crate::error::ErrorCode;
use crate::query::TextValue;

impl<'h, S: SerialPort, C: Clock> Nextion<'h, S, C> {
    /// Start a fresh component discovery
    ///
    /// The live directory is emptied at once and stays unloaded until the
    /// display finishes its transcript. Sends the configured discovery
    /// command, if any.
    pub fn request_component_list(&mut self) -> Result<(), ErrorCode> {
        let generation = self.ingester.next_generation();
        self.directory.restart(generation);
        self.loaded = false;
        self.ingester.open();
        if self.config.debug {
            debug!("requesting component list");
        }

        match self.config.discovery_command {
            Some(command) => self.send(&Command::Raw(command)),
            None => self.record(Ok(())),
        }
    }

    /// Returns true once a complete transcript has been received
    pub fn is_component_list_loaded(&self) -> bool {
        self.loaded
    }

    /// Components of the current generation
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Look up a component by name, recording `ComponentNotFound` on a miss
    pub fn component_by_name(&mut self, name: &str) -> Option<&Component> {
        if !self.directory.contains_name(name) {
            self.last_error = ErrorCode::ComponentNotFound;
            return None;
        }
        self.last_error = ErrorCode::Success;
        self.directory.by_name(name)
    }

    /// Look up a component by page/id, recording `ComponentNotFound` on a miss
    pub fn component_by_id(&mut self, page_id: u8, component_id: u8) -> Option<&Component> {
        if !self.directory.contains_id(page_id, component_id) {
            self.last_error = ErrorCode::ComponentNotFound;
            return None;
        }
        self.last_error = ErrorCode::Success;
        self.directory.by_id(page_id, component_id)
    }

    /// Log every component of the current generation
    pub fn log_component_list(&self) {
        info!(
            "component list: {} entries, generation {}",
            self.directory.len(),
            self.directory.generation()
        );
        for component in self.directory.iter() {
            info!(
                "  page={} id={} name={=str} kind={=str}",
                component.page_id,
                component.component_id,
                component.name.as_str(),
                component.kind.as_str()
            );
        }
    }

    /// Set `txt` on a text or button component named `name`
    pub fn set_text_by_name(&mut self, name: &str, value: &str) -> Result<(), ErrorCode> {
        self.check_name(name, ComponentKind::is_textual);
        self.set_text(Target::Name(name), value)
    }

    /// Set `txt` on the text or button component at `page_id`/`component_id`
    pub fn set_text_by_id(&mut self, page_id: u8, component_id: u8, value: &str) -> Result<(), ErrorCode> {
        match self.resolve_id(page_id, component_id, ComponentKind::is_textual) {
            Some(name) => self.set_text(Target::Name(&name), value),
            None => self.set_text(Target::address(page_id, component_id), value),
        }
    }

    /// Read `txt` from a text or button component named `name`
    pub fn get_text_by_name(&mut self, name: &str) -> Result<TextValue, ErrorCode> {
        self.check_name(name, ComponentKind::is_textual);
        self.get_text(Target::Name(name))
    }

    /// Read `txt` from the component at `page_id`/`component_id`
    pub fn get_text_by_id(&mut self, page_id: u8, component_id: u8) -> Result<TextValue, ErrorCode> {
        match self.resolve_id(page_id, component_id, ComponentKind::is_textual) {
            Some(name) => self.get_text(Target::Name(&name)),
            None => self.get_text(Target::address(page_id, component_id)),
        }
    }

    /// Set `val` on a number, gauge or progress component named `name`
    pub fn set_number_by_name(&mut self, name: &str, value: i32) -> Result<(), ErrorCode> {
        self.check_name(name, ComponentKind::is_numeric);
        self.set_number(Target::Name(name), value)
    }

    /// Set `val` on the numeric component at `page_id`/`component_id`
    pub fn set_number_by_id(&mut self, page_id: u8, component_id: u8, value: i32) -> Result<(), ErrorCode> {
        match self.resolve_id(page_id, component_id, ComponentKind::is_numeric) {
            Some(name) => self.set_number(Target::Name(&name), value),
            None => self.set_number(Target::address(page_id, component_id), value),
        }
    }

    /// Read `val` from a number, gauge or progress component named `name`
    pub fn get_number_by_name(&mut self, name: &str) -> Result<i32, ErrorCode> {
        self.check_name(name, ComponentKind::is_numeric);
        self.get_number(Target::Name(name))
    }

    /// Read `val` from the numeric component at `page_id`/`component_id`
    pub fn get_number_by_id(&mut self, page_id: u8, component_id: u8) -> Result<i32, ErrorCode> {
        match self.resolve_id(page_id, component_id, ComponentKind::is_numeric) {
            Some(name) => self.get_number(Target::Name(&name)),
            None => self.get_number(Target::address(page_id, component_id)),
        }
    }

    /// Name of a loaded component at `page_id`/`component_id` whose kind passes `accepts`
    fn resolve_id(
        &self,
        page_id: u8,
        component_id: u8,
        accepts: fn(ComponentKind) -> bool,
    ) -> Option<ComponentName> {
        let resolved = self
            .loaded
            .then(|| self.directory.by_id(page_id, component_id))
            .flatten()
            .filter(|component| accepts(component.kind))
            .map(|component| component.name.clone());

        if resolved.is_none() && self.config.debug {
            debug!("p[{}].b[{}] not resolved, using address", page_id, component_id);
        }
        resolved
    }

    fn check_name(&self, name: &str, accepts: fn(ComponentKind) -> bool) {
        let resolved = self.loaded
            && self
                .directory
                .by_name(name)
                .is_some_and(|component| accepts(component.kind));

        if !resolved && self.config.debug {
            debug!("{=str} not resolved, using name as given", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use nextion_hal::{MockClock, MockSerial};
    use nextion_protocol::frame::{encode_number_reply, encode_text_reply};
    use nextion_protocol::ComponentKind;
    use proptest::prelude::*;

    use crate::config::Config;
    use crate::driver::Nextion;
    use crate::error::ErrorCode;

    const TRANSCRIPT: &[u8] = b"component list begin\n\
        0,1,b0,button\n\
        0,2,t0,text\n\
        0,3,n0,number\n\
        1,4,g0,g\n\
        1,5,h0,z\n\
        component list end\n";

    const PROBE_REPLY: &[u8] = b"comok\xFF\xFF\xFF";

    fn loaded<'h>() -> Nextion<'h, MockSerial, MockClock> {
        let mut d = Nextion::new(MockSerial::new(), MockClock::default(), Config::default());
        d.port_mut().feed(TRANSCRIPT);
        d.poll();
        assert!(d.is_component_list_loaded());
        d
    }

    fn last_command(d: &Nextion<'_, MockSerial, MockClock>) -> std::string::String {
        let command = d.port().commands().last().unwrap_or_default();
        std::string::String::from_utf8_lossy(command).into_owned()
    }

    #[test]
    fn test_request_clears_directory() {
        let mut d = loaded();
        assert_eq!(d.directory().len(), 5);
        let stale = d.directory().handle_by_name("b0").unwrap();

        d.request_component_list().unwrap();
        assert!(!d.is_component_list_loaded());
        assert!(d.directory().is_empty());
        assert!(d.directory().get(stale).is_none());
        // No discovery command configured
        assert!(d.port().sent().is_empty());

        d.port_mut().feed(TRANSCRIPT);
        d.poll();
        assert!(d.is_component_list_loaded());
        assert!(d.directory().get(stale).is_none());
        assert!(d.directory().handle_by_name("b0").is_some());
    }

    #[test]
    fn test_request_sends_discovery_command() {
        let config = Config::default().with_discovery_command("printh 00");
        let mut d = Nextion::new(MockSerial::new(), MockClock::default(), config);

        d.begin().unwrap();
        assert_eq!(last_command(&d), "printh 00");
    }

    #[test]
    fn test_strict_lookups() {
        let mut d = loaded();

        assert_eq!(d.component_by_name("n0").map(|c| c.kind), Some(ComponentKind::Number));
        assert_eq!(d.last_error(), ErrorCode::Success);

        assert!(d.component_by_name("missing").is_none());
        assert_eq!(d.last_error(), ErrorCode::ComponentNotFound);

        assert_eq!(d.component_by_id(1, 5).map(|c| c.kind), Some(ComponentKind::Slider));
        assert!(d.component_by_id(9, 9).is_none());
        assert_eq!(d.last_error(), ErrorCode::ComponentNotFound);
    }

    #[test]
    fn test_directory_queries() {
        let d = loaded();
        let dir = d.directory();

        assert_eq!(dir.on_page(1).count(), 2);
        assert_eq!(dir.of_kind(ComponentKind::Gauge).next().unwrap().name.as_str(), "g0");
        assert!(dir.contains_id(0, 3));
        assert!(!dir.contains_name("x9"));
        d.log_component_list();
    }

    #[test]
    fn test_set_by_id_resolves_name() {
        let mut d = loaded();

        d.set_text_by_id(0, 2, "Hi").unwrap();
        assert_eq!(last_command(&d), "t0.txt=\"Hi\"");

        d.set_number_by_id(1, 4, 75).unwrap();
        assert_eq!(last_command(&d), "g0.val=75");
    }

    #[test]
    fn test_set_by_id_falls_back_on_kind_mismatch() {
        let mut d = loaded();

        // Slider is not in the numeric class
        d.set_number_by_id(1, 5, 10).unwrap();
        assert_eq!(last_command(&d), "p[1].b[5].val=10");

        // Number has no txt
        d.set_text_by_id(0, 3, "x").unwrap();
        assert_eq!(last_command(&d), "p[0].b[3].txt=\"x\"");
    }

    #[test]
    fn test_set_by_id_falls_back_when_unloaded() {
        let mut d = Nextion::new(MockSerial::new(), MockClock::default(), Config::default());

        d.set_text_by_id(0, 2, "Hi").unwrap();
        assert_eq!(last_command(&d), "p[0].b[2].txt=\"Hi\"");
    }

    #[test]
    fn test_set_by_name() {
        let mut d = loaded();

        d.set_text_by_name("b0", "OK").unwrap();
        assert_eq!(last_command(&d), "b0.txt=\"OK\"");

        d.set_number_by_name("unknown0", 3).unwrap();
        assert_eq!(last_command(&d), "unknown0.val=3");
    }

    #[test]
    fn test_get_by_id_and_name() {
        let mut d = loaded();
        d.port_mut().queue_reply(PROBE_REPLY);
        d.port_mut().queue_reply(&encode_number_reply(42));
        assert_eq!(d.get_number_by_id(0, 3), Ok(42));
        assert_eq!(last_command(&d), "get n0.val");

        d.port_mut().queue_reply(PROBE_REPLY);
        d.port_mut().queue_reply(&encode_text_reply("Hi").unwrap());
        assert_eq!(d.get_text_by_name("t0").unwrap().as_str(), "Hi");
        assert_eq!(last_command(&d), "get t0.txt");

        d.port_mut().queue_reply(PROBE_REPLY);
        d.port_mut().queue_reply(&encode_text_reply("?").unwrap());
        assert_eq!(d.get_text_by_id(2, 9).unwrap().as_str(), "?");
        assert_eq!(last_command(&d), "get p[2].b[9].txt");

        d.port_mut().queue_reply(PROBE_REPLY);
        d.port_mut().queue_reply(&encode_number_reply(-8));
        assert_eq!(d.get_number_by_name("g0"), Ok(-8));
    }

    proptest! {
        #[test]
        fn prop_rediscovery_is_idempotent(rows in proptest::collection::vec(
            (0u8..4, 0u8..32, "[a-z][a-z0-9]{0,6}", prop::sample::select(vec!["b", "t", "n", "g", "j", "z", "x"])),
            0..20,
        )) {
            let mut transcript = std::string::String::from("component list begin\n");
            for (page, id, name, kind) in &rows {
                transcript.push_str(&std::format!("{},{},{},{}\n", page, id, name, kind));
            }
            transcript.push_str("component list end\n");

            let mut d = Nextion::new(MockSerial::new(), MockClock::default(), Config::default());
            d.port_mut().feed(transcript.as_bytes());
            d.poll();
            let first: std::vec::Vec<_> = d.directory().iter().cloned().collect();

            d.request_component_list().unwrap();
            d.port_mut().feed(transcript.as_bytes());
            d.poll();
            let second: std::vec::Vec<_> = d.directory().iter().cloned().collect();

            prop_assert!(d.is_component_list_loaded());
            prop_assert_eq!(&first, &second);
            for component in &first {
                let by_name = d.directory().by_name(&component.name);
                prop_assert_eq!(by_name, Some(component));
                let by_id = d.directory().by_id(component.page_id, component.component_id);
                prop_assert_eq!(by_id, Some(component));
            }
        }
    }
}
