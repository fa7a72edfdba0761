mod policy_scenarios;
