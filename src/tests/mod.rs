mod test_annual_load;
