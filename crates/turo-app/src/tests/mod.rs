mod event_flow_tests;
mod support;
