use std::fmt;

/// Which side of a pair sends the first offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// Progress of the offer/answer exchange while a link is connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handshake {
    OfferSent,
    OfferReceived,
    AnswerSent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting(Handshake),
    Connected,
    Closing,
    Closed,
}

impl LinkState {
    pub fn is_closed(self) -> bool {
        self == LinkState::Closed
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Connecting(Handshake::OfferSent) => write!(f, "connecting(offer-sent)"),
            LinkState::Connecting(Handshake::OfferReceived) => {
                write!(f, "connecting(offer-received)")
            }
            LinkState::Connecting(Handshake::AnswerSent) => write!(f, "connecting(answer-sent)"),
            LinkState::Connected => write!(f, "connected"),
            LinkState::Closing => write!(f, "closing"),
            LinkState::Closed => write!(f, "closed"),
        }
    }
}
