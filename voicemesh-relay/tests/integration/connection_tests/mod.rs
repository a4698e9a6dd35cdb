mod test_leave_then_rejoin;
