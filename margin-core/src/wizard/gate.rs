use crate::models::{Contact, ContactField, ContactValidity};

/// The contact form that must be completed before the result is revealed.
#[derive(Debug, Clone, Default)]
pub struct ContactGate {
    contact: Contact,
    open: bool,
}

impl ContactGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the gate. Previously typed values are kept.
    pub fn open(&mut self) -> ContactValidity {
        self.open = true;
        self.validity()
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub fn contact_mut(&mut self) -> &mut Contact {
        &mut self.contact
    }

    pub fn set_field(
        &mut self,
        field: ContactField,
        raw: &str,
    ) -> ContactValidity {
        self.contact.set(field, raw);
        self.validity()
    }

    pub fn validity(&self) -> ContactValidity {
        self.contact.validity()
    }

    /// Whether the gate form can be submitted.
    pub fn is_ready(&self) -> bool {
        self.open && self.validity().all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_gate_is_never_ready() {
        let mut gate = ContactGate::new();
        gate.set_field(ContactField::Name, "Ana");
        gate.set_field(ContactField::Phone, "11987654321");
        gate.set_field(ContactField::Email, "ana@x.com");

        assert!(!gate.is_ready());
        gate.open();
        assert!(gate.is_ready());
    }

    #[test]
    fn submit_needs_every_field() {
        let mut gate = ContactGate::new();
        gate.open();
        gate.set_field(ContactField::Name, "Ana");
        let validity = gate.set_field(ContactField::Phone, "123");

        assert!(validity.name);
        assert!(!validity.phone);
        assert!(!gate.is_ready());
    }
}
