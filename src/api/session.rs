/// Answers whether the visitor may use the calculator. Login and logout live
/// elsewhere; the calculator only reads the flag.
pub trait SessionGate: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Gate backed by a configured flag.
#[derive(Debug, Clone, Copy)]
pub struct StaticSessionGate {
    authenticated: bool,
}

impl StaticSessionGate {
    pub fn new(authenticated: bool) -> Self {
        Self { authenticated }
    }
}

impl SessionGate for StaticSessionGate {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
