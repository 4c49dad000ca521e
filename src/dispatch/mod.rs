pub mod dispatcher;
pub mod dispatcher_config;
pub mod packet_handler;
pub mod scheduling_ring;
pub mod serialized;
