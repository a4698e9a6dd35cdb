mod test_rejoin_replaces_link;
mod test_stale_link_events;
