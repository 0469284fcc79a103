mod adc;
