pub mod event;
pub mod ticket;

pub use event::{Event, NewEvent};
pub use ticket::{NewTicket, Ticket};
