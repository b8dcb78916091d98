use std::collections::BTreeMap;

/// Symbolic events a breakpoint can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DebugEvent {
    Nmi,
}

impl DebugEvent {
    pub fn from_name(name: &str) -> Option<DebugEvent> {
        match name.to_ascii_lowercase().as_str() {
            "nmi" => Some(DebugEvent::Nmi),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Breakpoints {
    addresses: BTreeMap<u16, bool>,
    events: BTreeMap<DebugEvent, bool>,
}

impl Breakpoints {
    pub fn set(&mut self, addr: u16, enabled: bool) {
        self.addresses.insert(addr, enabled);
    }

    pub fn set_event(&mut self, event: DebugEvent, enabled: bool) {
        self.events.insert(event, enabled);
    }

    pub fn is_enabled(&self, addr: u16) -> bool {
        self.addresses.get(&addr).copied().unwrap_or(false)
    }

    pub fn is_event_enabled(&self, event: DebugEvent) -> bool {
        self.events.get(&event).copied().unwrap_or(false)
    }

    /// Enabled address breakpoints, in address order
    pub fn enabled_addresses(&self) -> impl Iterator<Item = u16> + '_ {
        self.addresses
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(addr, _)| *addr)
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
        self.events.clear();
    }
}

#[derive(Debug, Default, Clone)]
pub struct Watchpoints {
    read: BTreeMap<u16, bool>,
    write: BTreeMap<u16, bool>,
}

impl Watchpoints {
    pub fn set_read(&mut self, addr: u16, enabled: bool) {
        self.read.insert(addr, enabled);
    }

    pub fn set_write(&mut self, addr: u16, enabled: bool) {
        self.write.insert(addr, enabled);
    }

    pub fn watches_read(&self, addr: u16) -> bool {
        self.read.get(&addr).copied().unwrap_or(false)
    }

    pub fn watches_write(&self, addr: u16) -> bool {
        self.write.get(&addr).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.read.clear();
        self.write.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_breakpoint_stays_registered_but_inactive() {
        let mut bp = Breakpoints::default();
        bp.set(0x8000, true);
        bp.set(0x9000, true);
        bp.set(0x8000, false);

        assert!(!bp.is_enabled(0x8000));
        assert!(bp.is_enabled(0x9000));
        assert_eq!(bp.enabled_addresses().collect::<Vec<_>>(), vec![0x9000]);
    }

    #[test]
    fn event_names_are_case_insensitive() {
        assert_eq!(DebugEvent::from_name("nmi"), Some(DebugEvent::Nmi));
        assert_eq!(DebugEvent::from_name("NMI"), Some(DebugEvent::Nmi));
        assert_eq!(DebugEvent::from_name("irq"), None);
    }

    #[test]
    fn clear_drops_addresses_and_events() {
        let mut bp = Breakpoints::default();
        bp.set(0x1234, true);
        bp.set_event(DebugEvent::Nmi, true);
        bp.clear();
        assert!(!bp.is_enabled(0x1234));
        assert!(!bp.is_event_enabled(DebugEvent::Nmi));
    }

    #[test]
    fn read_and_write_watches_are_independent() {
        let mut wp = Watchpoints::default();
        wp.set_read(0x0200, true);
        assert!(wp.watches_read(0x0200));
        assert!(!wp.watches_write(0x0200));
    }
}
